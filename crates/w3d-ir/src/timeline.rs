use serde::{Deserialize, Serialize};
use w3d_core::Duration;

use crate::action::Action;

/// An action list fired at an offset from the timeline's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedAction {
    pub offset: Duration,
    pub actions: Vec<Action>,
}

/// A named schedule of timed actions.
///
/// Offsets need not be declared in order; [`Timeline::sorted`] gives the
/// firing order. Equal offsets keep declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub name: String,
    /// Start when the scene starts (and again after a reset).
    #[serde(default)]
    pub start_immediately: bool,
    #[serde(default)]
    pub actions: Vec<TimedAction>,
}

impl Timeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_immediately: false,
            actions: Vec::new(),
        }
    }

    /// Builder: add an action list at `offset` seconds.
    pub fn at(mut self, offset: f64, actions: Vec<Action>) -> Self {
        self.actions.push(TimedAction {
            offset: Duration::from_seconds(offset),
            actions,
        });
        self
    }

    /// Builder: start with the scene.
    pub fn autostart(mut self) -> Self {
        self.start_immediately = true;
        self
    }

    /// Timed actions in ascending offset order (stable).
    pub fn sorted(&self) -> Vec<&TimedAction> {
        let mut sorted: Vec<&TimedAction> = self.actions.iter().collect();
        sorted.sort_by(|a, b| {
            a.offset
                .as_seconds()
                .total_cmp(&b.offset.as_seconds())
        });
        sorted
    }

    /// Offset of the last timed action, or zero for an empty timeline.
    pub fn length(&self) -> Duration {
        self.actions
            .iter()
            .map(|a| a.offset)
            .fold(Duration::zero(), |max, o| if o > max { o } else { max })
    }
}
