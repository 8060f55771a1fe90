use serde::{Deserialize, Serialize};

/// The kind of a named, declared project element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    /// A scene object (text, image, model, light, particles, shape).
    Entity,
    /// A named collection of entities.
    Group,
    /// A scheduled list of timed actions.
    Timeline,
    /// A condition bound to enter/exit action lists.
    Trigger,
    /// A named sound clip.
    Sound,
    /// A reference frame (wall, center, or entity) used by placements.
    Frame,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Entity => write!(f, "entity"),
            FeatureKind::Group => write!(f, "group"),
            FeatureKind::Timeline => write!(f, "timeline"),
            FeatureKind::Trigger => write!(f, "trigger"),
            FeatureKind::Sound => write!(f, "sound"),
            FeatureKind::Frame => write!(f, "reference frame"),
        }
    }
}

/// A runtime-mutable property of an entity (or of the viewer rig).
///
/// Transitions are keyed by target and property, so two actions touching the
/// same property of the same target never run side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Property {
    Transform,
    Color,
    Visibility,
    Scale,
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Property::Transform => write!(f, "transform"),
            Property::Color => write!(f, "color"),
            Property::Visibility => write!(f, "visibility"),
            Property::Scale => write!(f, "scale"),
        }
    }
}

/// How a group reference expands into concrete targets when an action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Every member, in declaration order.
    All,
    /// Exactly one member, drawn uniformly at random on every firing.
    OneRandom,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_kind_display() {
        assert_eq!(FeatureKind::Frame.to_string(), "reference frame");
        assert_eq!(FeatureKind::Entity.to_string(), "entity");
    }

    #[test]
    fn test_property_ordering_is_stable() {
        let mut props = vec![Property::Scale, Property::Transform, Property::Color];
        props.sort();
        assert_eq!(
            props,
            vec![Property::Transform, Property::Color, Property::Scale]
        );
    }

    #[test]
    fn test_selection_policy_default() {
        assert_eq!(SelectionPolicy::default(), SelectionPolicy::All);
    }
}
