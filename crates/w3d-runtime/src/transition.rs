use std::collections::BTreeMap;

use w3d_core::{Color, Property, Transform};

use crate::state::TransitionTarget;

/// The value a transition interpolates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionValue {
    Transform(Transform),
    Color(Color),
    /// Opacity or scale.
    Scalar(f32),
}

impl TransitionValue {
    /// Interpolate towards `end` at `t` in [0, 1]. Mismatched kinds snap to `end`.
    pub fn lerp(&self, end: &TransitionValue, t: f32) -> TransitionValue {
        match (self, end) {
            (TransitionValue::Transform(a), TransitionValue::Transform(b)) => {
                TransitionValue::Transform(a.lerp(b, t))
            }
            (TransitionValue::Color(a), TransitionValue::Color(b)) => {
                TransitionValue::Color(a.lerp(b, t))
            }
            (TransitionValue::Scalar(a), TransitionValue::Scalar(b)) => {
                TransitionValue::Scalar(a + (b - a) * t.clamp(0.0, 1.0))
            }
            _ => *end,
        }
    }
}

/// A time-bounded interpolation of one property of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub start: TransitionValue,
    pub end: TransitionValue,
    pub duration: f64,
    pub elapsed: f64,
    /// Set when the transition ends at zero opacity and should hide its target.
    pub hide_at_end: bool,
    /// Created this tick; it first advances on the next tick.
    fresh: bool,
}

impl Transition {
    pub fn new(start: TransitionValue, end: TransitionValue, duration: f64) -> Self {
        Self {
            start,
            end,
            duration,
            elapsed: 0.0,
            hide_at_end: false,
            fresh: true,
        }
    }

    pub fn hiding(mut self) -> Self {
        self.hide_at_end = true;
        self
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> TransitionValue {
        self.start.lerp(&self.end, self.progress() as f32)
    }
}

pub type TransitionKey = (TransitionTarget, Property);

/// One step of a transition, as applied to the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStep {
    pub key: TransitionKey,
    pub value: TransitionValue,
    pub finished: bool,
    pub hide_at_end: bool,
}

/// Live transitions, at most one per `(target, property)`.
#[derive(Debug, Clone, Default)]
pub struct TransitionSet {
    active: BTreeMap<TransitionKey, Transition>,
}

impl TransitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transition, replacing any live one on the same key.
    pub fn insert(&mut self, key: TransitionKey, transition: Transition) -> Option<Transition> {
        self.active.insert(key, transition)
    }

    pub fn cancel(&mut self, key: &TransitionKey) -> Option<Transition> {
        self.active.remove(key)
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn get(&self, key: &TransitionKey) -> Option<&Transition> {
        self.active.get(key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Treat every transition as created before this tick.
    pub fn settle(&mut self) {
        self.active.values_mut().for_each(|t| t.fresh = false);
    }

    /// Advance every transition that was not created this tick by `dt`.
    ///
    /// A transition reaching `elapsed + epsilon >= duration` yields its exact
    /// end value and is removed. Steps come out in key order.
    pub fn advance(&mut self, dt: f64, epsilon: f64) -> Vec<TransitionStep> {
        let mut steps = Vec::new();
        for (key, transition) in self.active.iter_mut() {
            if transition.fresh {
                transition.fresh = false;
                continue;
            }
            transition.elapsed += dt;
            let finished = transition.elapsed + epsilon >= transition.duration;
            let value = if finished {
                transition.end
            } else {
                transition.value()
            };
            steps.push(TransitionStep {
                key: *key,
                value,
                finished,
                hide_at_end: transition.hide_at_end,
            });
        }
        for step in steps.iter().filter(|s| s.finished) {
            self.active.remove(&step.key);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::EntityId;
    use w3d_core::Vec3;

    fn key(property: Property) -> TransitionKey {
        (TransitionTarget::Entity(EntityId::from_index(0)), property)
    }

    fn scalar(v: &TransitionValue) -> f32 {
        match v {
            TransitionValue::Scalar(s) => *s,
            other => panic!("expected scalar, got {:?}", other),
        }
    }

    #[test]
    fn test_fresh_transition_waits_one_tick() {
        let mut set = TransitionSet::new();
        set.insert(
            key(Property::Scale),
            Transition::new(TransitionValue::Scalar(0.0), TransitionValue::Scalar(1.0), 1.0),
        );
        assert!(set.advance(0.5, 1e-9).is_empty());
        let steps = set.advance(0.5, 1e-9);
        assert_eq!(steps.len(), 1);
        assert!((scalar(&steps[0].value) - 0.5).abs() < 1e-6);
        assert!(!steps[0].finished);
    }

    #[test]
    fn test_finishes_exactly_at_end() {
        let mut set = TransitionSet::new();
        let start = Transform::IDENTITY;
        let end = Transform::from_position(Vec3::new(0.0, 0.0, 1.0));
        set.insert(
            key(Property::Transform),
            Transition::new(
                TransitionValue::Transform(start),
                TransitionValue::Transform(end),
                1.0,
            ),
        );
        set.settle();
        let mut last = None;
        for _ in 0..4 {
            last = set.advance(0.25, 1e-9).pop();
        }
        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.value, TransitionValue::Transform(end));
        assert!(set.is_empty());
    }

    #[test]
    fn test_overshooting_dt_snaps_to_end() {
        let mut set = TransitionSet::new();
        set.insert(
            key(Property::Scale),
            Transition::new(TransitionValue::Scalar(1.0), TransitionValue::Scalar(3.0), 0.3),
        );
        set.settle();
        let steps = set.advance(1.0, 1e-9);
        assert!(steps[0].finished);
        assert!((scalar(&steps[0].value) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut set = TransitionSet::new();
        let k = key(Property::Color);
        set.insert(
            k,
            Transition::new(
                TransitionValue::Color(Color::BLACK),
                TransitionValue::Color(Color::RED),
                1.0,
            ),
        );
        let replaced = set.insert(
            k,
            Transition::new(
                TransitionValue::Color(Color::BLACK),
                TransitionValue::Color(Color::BLUE),
                1.0,
            ),
        );
        assert!(replaced.is_some());
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(&k).map(|t| t.end), Some(TransitionValue::Color(Color::BLUE)));
    }
}
