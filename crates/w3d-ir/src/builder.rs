use crate::action::Action;
use crate::entity::{Content, Entity};
use crate::group::Group;
use crate::link::Link;
use crate::placement::Placement;
use crate::project::{FrameDecl, Project, ProjectSettings};
use crate::sound::Sound;
use crate::timeline::{TimedAction, Timeline};
use crate::trigger::{Trigger, TriggerCondition};

use w3d_core::{Color, Duration};

/// A builder for constructing a project programmatically.
/// Useful for tests and for hosts that generate scenes.
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            project: Project::new(ProjectSettings::default()),
        }
    }

    /// Declare an extra reference frame.
    pub fn add_frame(&mut self, name: impl Into<String>, placement: Placement) -> &mut Self {
        self.project
            .settings
            .frames
            .push(FrameDecl::new(name, placement));
        self
    }

    /// Set the viewer rig's initial placement.
    pub fn viewer(&mut self, placement: Placement) -> &mut Self {
        self.project.settings.viewer = placement;
        self
    }

    pub fn add_entity(&mut self, entity: Entity) -> &mut Self {
        self.project.entities.push(entity);
        self
    }

    pub fn add_group(&mut self, group: Group) -> &mut Self {
        self.project.groups.push(group);
        self
    }

    pub fn add_sound(&mut self, sound: Sound) -> &mut Self {
        self.project.sounds.push(sound);
        self
    }

    /// Add a trigger. Triggers are evaluated in the order they are added.
    pub fn add_trigger(&mut self, trigger: Trigger) -> &mut Self {
        self.project.triggers.push(trigger);
        self
    }

    pub fn add_timeline(&mut self, timeline: Timeline) -> &mut Self {
        self.project.timelines.push(timeline);
        self
    }

    /// Build and return the project.
    pub fn build(self) -> Project {
        self.project
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A builder for a single entity.
pub struct EntityBuilder {
    entity: Entity,
}

impl EntityBuilder {
    pub fn new(name: impl Into<String>, content: Content) -> Self {
        Self {
            entity: Entity::new(name, content),
        }
    }

    pub fn placement(&mut self, placement: Placement) -> &mut Self {
        self.entity.placement = placement;
        self
    }

    pub fn color(&mut self, color: Color) -> &mut Self {
        self.entity.color = color;
        self
    }

    /// Start invisible.
    pub fn hidden(&mut self) -> &mut Self {
        self.entity.visible = false;
        self
    }

    pub fn scale(&mut self, scale: f32) -> &mut Self {
        self.entity.scale = scale;
        self
    }

    /// Compose relative rotations about the entity's own axes.
    pub fn around_own_axis(&mut self) -> &mut Self {
        self.entity.around_own_axis = true;
        self
    }

    pub fn sound(&mut self, sound: impl Into<String>) -> &mut Self {
        self.entity.sound = Some(sound.into());
        self
    }

    pub fn link(&mut self, link: Link) -> &mut Self {
        self.entity.link = Some(link);
        self
    }

    pub fn build(self) -> Entity {
        self.entity
    }
}

/// A builder for a timeline.
pub struct TimelineBuilder {
    timeline: Timeline,
}

impl TimelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            timeline: Timeline::new(name),
        }
    }

    /// Start with the scene.
    pub fn autostart(&mut self) -> &mut Self {
        self.timeline.start_immediately = true;
        self
    }

    /// Add an action at `offset` seconds, merging into an existing list at
    /// the same offset.
    pub fn at(&mut self, offset: f64, action: Action) -> &mut Self {
        let offset = Duration::from_seconds(offset);
        match self.timeline.actions.iter_mut().find(|a| a.offset == offset) {
            Some(timed) => timed.actions.push(action),
            None => self.timeline.actions.push(TimedAction {
                offset,
                actions: vec![action],
            }),
        }
        self
    }

    pub fn build(self) -> Timeline {
        self.timeline
    }
}

/// A builder for a trigger.
pub struct TriggerBuilder {
    trigger: Trigger,
}

impl TriggerBuilder {
    pub fn new(name: impl Into<String>, condition: TriggerCondition) -> Self {
        Self {
            trigger: Trigger::new(name, condition),
        }
    }

    pub fn on_enter(&mut self, action: Action) -> &mut Self {
        self.trigger.enter.push(action);
        self
    }

    /// Add an exit action. Declaring one enables exit events.
    pub fn on_exit(&mut self, action: Action) -> &mut Self {
        self.trigger.exit.get_or_insert_with(Vec::new).push(action);
        self
    }

    /// Fire once, then disable.
    pub fn once(&mut self) -> &mut Self {
        self.trigger.remain_enabled = false;
        self
    }

    /// Start disabled.
    pub fn disabled(&mut self) -> &mut Self {
        self.trigger.enabled = false;
        self
    }

    pub fn build(self) -> Trigger {
        self.trigger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ObjectChange, Target};
    use crate::validate::validate_project;

    #[test]
    fn test_builder_produces_valid_project() {
        let mut cube = EntityBuilder::new(
            "cube",
            Content::Shape {
                shape: crate::entity::ShapeKind::Sphere { radius: 0.5 },
            },
        );
        cube.color(Color::RED).hidden();

        let mut timeline = TimelineBuilder::new("intro");
        timeline
            .autostart()
            .at(
                0.0,
                Action::object_over(Target::object("cube"), 1.0, ObjectChange::Visible(true)),
            )
            .at(0.0, Action::Reset);

        let mut builder = ProjectBuilder::new();
        builder.add_entity(cube.build()).add_timeline(timeline.build());
        let project = builder.build();

        assert_eq!(project.entities.len(), 1);
        assert!(!project.entities[0].visible);
        assert_eq!(project.timelines[0].actions.len(), 1);
        assert_eq!(project.timelines[0].actions[0].actions.len(), 2);
        assert!(validate_project(&project).is_ok());
    }

    #[test]
    fn test_trigger_builder_exit() {
        let mut trigger =
            TriggerBuilder::new("t", TriggerCondition::HeadPosition { region: None });
        trigger.once().on_exit(Action::Reset);
        let trigger = trigger.build();
        assert!(!trigger.remain_enabled);
        assert_eq!(trigger.exit.as_ref().map(Vec::len), Some(1));
        assert!(trigger.enter.is_empty());
    }
}
