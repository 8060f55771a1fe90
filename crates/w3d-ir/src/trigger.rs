use serde::{Deserialize, Serialize};
use w3d_core::Vec3;

use crate::action::Action;

/// Which side of an [`EventBox`] satisfies the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BoxDirection {
    #[default]
    Inside,
    Outside,
}

/// An axis-aligned box in world space used by position and movement triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBox {
    pub corner1: Vec3,
    pub corner2: Vec3,
    #[serde(default)]
    pub direction: BoxDirection,
    /// Treat the box as infinitely tall.
    #[serde(default)]
    pub ignore_y: bool,
}

impl EventBox {
    pub fn new(corner1: Vec3, corner2: Vec3) -> Self {
        Self {
            corner1,
            corner2,
            direction: BoxDirection::Inside,
            ignore_y: false,
        }
    }

    /// Builder: satisfy the condition outside the box instead.
    pub fn outside(mut self) -> Self {
        self.direction = BoxDirection::Outside;
        self
    }

    /// Builder: ignore the vertical axis.
    pub fn ignoring_y(mut self) -> Self {
        self.ignore_y = true;
        self
    }

    /// Whether `point` lies within the box, corners inclusive.
    pub fn contains(&self, point: Vec3) -> bool {
        let min = self.corner1.min(self.corner2);
        let max = self.corner1.max(self.corner2);
        let within = |v: f32, lo: f32, hi: f32| v >= lo && v <= hi;
        within(point.x, min.x, max.x)
            && within(point.z, min.z, max.z)
            && (self.ignore_y || within(point.y, min.y, max.y))
    }

    /// Whether `point` satisfies the box's direction.
    pub fn test(&self, point: Vec3) -> bool {
        match self.direction {
            BoxDirection::Inside => self.contains(point),
            BoxDirection::Outside => !self.contains(point),
        }
    }
}

/// What moves in an object-movement trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementSource {
    /// A single entity.
    Object(String),
    /// Any member of the group.
    GroupAny(String),
    /// Every member of the group.
    GroupAll(String),
}

fn default_gaze_angle() -> f32 {
    30.0
}

/// The condition a trigger watches. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// Viewer yaw and pitch both within inclusive `(min, max)` ranges.
    HeadOrientation { yaw: (f32, f32), pitch: (f32, f32) },
    /// Viewer head inside (or outside) a region; `None` matches anywhere.
    HeadPosition {
        #[serde(default)]
        region: Option<EventBox>,
    },
    /// Gaze within `angle` of the direction to a world-space point.
    LookAtPoint {
        point: Vec3,
        #[serde(default = "default_gaze_angle")]
        angle: f32,
    },
    /// Gaze within `angle` of a world-space direction.
    LookAtDirection {
        direction: Vec3,
        #[serde(default = "default_gaze_angle")]
        angle: f32,
    },
    /// Gaze within `angle` of the direction to an entity's current position.
    LookAtObject {
        object: String,
        #[serde(default = "default_gaze_angle")]
        angle: f32,
    },
    /// Entity position(s) inside (or outside) a region.
    ObjectMovement {
        source: MovementSource,
        region: EventBox,
    },
}

/// An edge-triggered condition with enter and exit action lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When false, the trigger disables itself after firing `enter`.
    #[serde(default = "default_true")]
    pub remain_enabled: bool,
    pub condition: TriggerCondition,
    /// Fired when the condition becomes true.
    #[serde(default)]
    pub enter: Vec<Action>,
    /// Fired when the condition becomes false, if declared.
    #[serde(default)]
    pub exit: Option<Vec<Action>>,
}

fn default_true() -> bool {
    true
}

impl Trigger {
    pub fn new(name: impl Into<String>, condition: TriggerCondition) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            remain_enabled: true,
            condition,
            enter: Vec::new(),
            exit: None,
        }
    }

    /// Every action in both lists.
    pub fn all_actions(&self) -> impl Iterator<Item = &Action> {
        self.enter
            .iter()
            .chain(self.exit.iter().flat_map(|list| list.iter()))
    }
}
