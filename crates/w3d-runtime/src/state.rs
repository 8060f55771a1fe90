use std::collections::BTreeSet;

use w3d_core::{Color, Property, Transform};

use crate::bind::EntityId;

/// The mutable runtime state of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityState {
    /// World transform.
    pub transform: Transform,
    pub color: Color,
    pub visible: bool,
    /// Fade level in [0, 1].
    pub opacity: f32,
    pub scale: f32,
}

/// What a transition or a host update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransitionTarget {
    Entity(EntityId),
    /// The viewer rig.
    Viewer,
}

/// Live scene values plus the set of `(target, property)` pairs changed since
/// the last flush.
#[derive(Debug, Clone, Default)]
pub struct SceneState {
    pub entities: Vec<EntityState>,
    pub viewer: Transform,
    dirty: BTreeSet<(TransitionTarget, Property)>,
}

impl SceneState {
    pub fn new(entities: Vec<EntityState>, viewer: Transform) -> Self {
        Self {
            entities,
            viewer,
            dirty: BTreeSet::new(),
        }
    }

    pub fn entity(&self, id: EntityId) -> &EntityState {
        &self.entities[id.index()]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut EntityState {
        &mut self.entities[id.index()]
    }

    pub fn mark(&mut self, target: TransitionTarget, property: Property) {
        self.dirty.insert((target, property));
    }

    /// Mark every property of every entity and the viewer.
    pub fn mark_all(&mut self) {
        for i in 0..self.entities.len() {
            let target = TransitionTarget::Entity(EntityId::from_index(i));
            for property in [
                Property::Transform,
                Property::Color,
                Property::Visibility,
                Property::Scale,
            ] {
                self.dirty.insert((target, property));
            }
        }
        self.dirty.insert((TransitionTarget::Viewer, Property::Transform));
    }

    /// Take the changed keys in a stable order, clearing the set.
    pub fn take_dirty(&mut self) -> Vec<(TransitionTarget, Property)> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}
