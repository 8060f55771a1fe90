use serde::{Deserialize, Serialize};
use uuid::Uuid;
use w3d_core::{Color, Vec3};

use crate::action::Action;
use crate::entity::Entity;
use crate::group::Group;
use crate::placement::{Placement, Rotation, CENTER};
use crate::sound::Sound;
use crate::timeline::Timeline;
use crate::trigger::Trigger;

/// A named reference frame that placements may be expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDecl {
    pub name: String,
    pub placement: Placement,
}

impl FrameDecl {
    pub fn new(name: impl Into<String>, placement: Placement) -> Self {
        Self {
            name: name.into(),
            placement,
        }
    }
}

/// Global scene settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Declared reference frames. `Center` is implicit and always present.
    #[serde(default = "ProjectSettings::default_frames")]
    pub frames: Vec<FrameDecl>,
    /// Initial placement of the viewer rig.
    #[serde(default = "ProjectSettings::default_viewer")]
    pub viewer: Placement,
    #[serde(default = "ProjectSettings::default_background")]
    pub background: Color,
}

impl ProjectSettings {
    /// The walls of a four-sided CAVE, four units from the center.
    pub fn default_frames() -> Vec<FrameDecl> {
        let wall = |name: &str, position: Vec3, rotation: Rotation| {
            FrameDecl::new(name, Placement::at(position).with_rotation(rotation))
        };
        vec![
            wall("FrontWall", Vec3::new(0.0, 0.0, -4.0), Rotation::None),
            wall(
                "LeftWall",
                Vec3::new(-4.0, 0.0, 0.0),
                Rotation::Axis {
                    axis: Vec3::Y,
                    angle_degrees: 90.0,
                },
            ),
            wall(
                "RightWall",
                Vec3::new(4.0, 0.0, 0.0),
                Rotation::Axis {
                    axis: Vec3::Y,
                    angle_degrees: -90.0,
                },
            ),
            wall(
                "FloorWall",
                Vec3::new(0.0, -4.0, 0.0),
                Rotation::Axis {
                    axis: Vec3::X,
                    angle_degrees: -90.0,
                },
            ),
        ]
    }

    fn default_viewer() -> Placement {
        Placement::at(Vec3::new(0.0, 0.0, 6.0))
    }

    fn default_background() -> Color {
        Color::BLACK
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            frames: Self::default_frames(),
            viewer: Self::default_viewer(),
            background: Self::default_background(),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Top-level project: the root of the feature tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub sounds: Vec<Sound>,
    /// Evaluated in declaration order every tick.
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub timelines: Vec<Timeline>,
}

impl Project {
    /// Create an empty project with the given settings.
    pub fn new(settings: ProjectSettings) -> Self {
        Self {
            id: new_id(),
            settings,
            entities: Vec::new(),
            groups: Vec::new(),
            sounds: Vec::new(),
            triggers: Vec::new(),
            timelines: Vec::new(),
        }
    }

    /// Parse a project from its JSON interchange form.
    pub fn from_json(json: &str) -> w3d_core::W3dResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> w3d_core::W3dResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn sound(&self, name: &str) -> Option<&Sound> {
        self.sounds.iter().find(|s| s.name == name)
    }

    pub fn trigger(&self, name: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn timeline(&self, name: &str) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.name == name)
    }

    /// A declared frame. `Center` is not declared and returns `None`.
    pub fn frame(&self, name: &str) -> Option<&FrameDecl> {
        self.settings.frames.iter().find(|f| f.name == name)
    }

    /// Whether `name` can appear in a placement's `relative_to`.
    pub fn is_frame_name(&self, name: &str) -> bool {
        name == CENTER || self.frame(name).is_some() || self.entity(name).is_some()
    }

    /// Every action reachable from links, triggers and timelines.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        let links = self
            .entities
            .iter()
            .filter_map(|e| e.link.as_ref())
            .flat_map(|l| l.all_actions());
        let triggers = self.triggers.iter().flat_map(|t| t.all_actions());
        let timelines = self
            .timelines
            .iter()
            .flat_map(|t| t.actions.iter().flat_map(|a| a.actions.iter()));
        links.chain(triggers).chain(timelines)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new(ProjectSettings::default())
    }
}
