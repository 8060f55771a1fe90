use serde::{Deserialize, Serialize};
use w3d_core::{Color, Duration, Property, SelectionPolicy};

use crate::placement::Placement;

/// What an object action applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    /// One named entity.
    Object(String),
    /// Members of a group, selected by `policy` each time the action fires.
    Group {
        group: String,
        #[serde(default)]
        policy: SelectionPolicy,
    },
}

impl Target {
    pub fn object(name: impl Into<String>) -> Self {
        Target::Object(name.into())
    }

    pub fn group(name: impl Into<String>) -> Self {
        Target::Group {
            group: name.into(),
            policy: SelectionPolicy::All,
        }
    }

    pub fn random(name: impl Into<String>) -> Self {
        Target::Group {
            group: name.into(),
            policy: SelectionPolicy::OneRandom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundChange {
    Play,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkChange {
    Enable,
    Disable,
    /// Fire the link as if clicked, even when disabled.
    Activate,
    /// Fire the link as if clicked, only when enabled.
    ActivateIfEnabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineChange {
    /// Start from the beginning, restarting a running timeline.
    Start,
    /// Pause, keeping the position.
    Stop,
    /// Resume from the kept position, or start if never started.
    Continue,
    /// Start only if not currently running.
    StartIfNotStarted,
}

/// A change applied to each target entity of an object action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectChange {
    /// Fade in (true) or out (false).
    Visible(bool),
    Color(Color),
    /// Absolute uniform scale.
    Scale(f32),
    /// Move to a placement, or by an offset when `relative`.
    Move {
        placement: Placement,
        #[serde(default)]
        relative: bool,
    },
    /// Play or stop the entity's attached sound.
    Sound(SoundChange),
    Link(LinkChange),
}

impl ObjectChange {
    /// The interpolated property this change drives, if it is a transition.
    pub fn property(&self) -> Option<Property> {
        match self {
            ObjectChange::Visible(_) => Some(Property::Visibility),
            ObjectChange::Color(_) => Some(Property::Color),
            ObjectChange::Scale(_) => Some(Property::Scale),
            ObjectChange::Move { .. } => Some(Property::Transform),
            ObjectChange::Sound(_) | ObjectChange::Link(_) => None,
        }
    }
}

/// A single instruction fired by a trigger, link or timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Object {
        target: Target,
        /// Zero applies the change at once.
        #[serde(default)]
        duration: Duration,
        change: ObjectChange,
    },
    Timeline {
        timeline: String,
        change: TimelineChange,
    },
    Sound {
        sound: String,
        change: SoundChange,
    },
    /// Enable or disable a trigger.
    Trigger { trigger: String, enable: bool },
    /// Move the viewer rig.
    MoveViewer {
        placement: Placement,
        #[serde(default)]
        relative: bool,
        #[serde(default)]
        duration: Duration,
    },
    /// Restore the scene to its initial state.
    Reset,
}

impl Action {
    /// An instantaneous object action.
    pub fn object(target: Target, change: ObjectChange) -> Self {
        Action::Object {
            target,
            duration: Duration::zero(),
            change,
        }
    }

    /// An object action interpolated over `seconds`.
    pub fn object_over(target: Target, seconds: f64, change: ObjectChange) -> Self {
        Action::Object {
            target,
            duration: Duration::from_seconds(seconds),
            change,
        }
    }

    pub fn timeline(name: impl Into<String>, change: TimelineChange) -> Self {
        Action::Timeline {
            timeline: name.into(),
            change,
        }
    }

    pub fn sound(name: impl Into<String>, change: SoundChange) -> Self {
        Action::Sound {
            sound: name.into(),
            change,
        }
    }

    pub fn trigger(name: impl Into<String>, enable: bool) -> Self {
        Action::Trigger {
            trigger: name.into(),
            enable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_property() {
        assert_eq!(
            ObjectChange::Visible(true).property(),
            Some(Property::Visibility)
        );
        assert_eq!(
            ObjectChange::Move {
                placement: Placement::default(),
                relative: true
            }
            .property(),
            Some(Property::Transform)
        );
        assert_eq!(ObjectChange::Sound(SoundChange::Play).property(), None);
    }

    #[test]
    fn test_action_json_shape() {
        let action = Action::object_over(
            Target::random("balls"),
            1.0,
            ObjectChange::Color(Color::RED),
        );
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);

        let parsed: Action = serde_json::from_str(
            r#"{"Object": {"target": {"Group": {"group": "balls"}}, "change": {"Scale": 2.0}}}"#,
        )
        .unwrap();
        match parsed {
            Action::Object {
                target: Target::Group { policy, .. },
                duration,
                ..
            } => {
                assert_eq!(policy, SelectionPolicy::All);
                assert!(duration.is_zero());
            }
            other => panic!("unexpected action {:?}", other),
        }
    }
}
