//! Action dispatch: turns fired action lists into state changes,
//! transitions and component updates.

use std::collections::VecDeque;
use std::sync::Arc;

use w3d_core::Property;
use w3d_ir::{LinkChange, SoundChange};

use crate::bind::{
    ActionListId, BoundAction, BoundChange, BoundPlacement, BoundProject, BoundTarget, EntityId,
    SoundId, TimelineId,
};
use crate::host::SceneHost;
use crate::runtime::Runtime;
use crate::state::TransitionTarget;
use crate::timeline::TimelineFiring;
use crate::transition::{Transition, TransitionKey, TransitionValue};

/// Where a queued list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A trigger edge, a link click or scene start.
    Event,
    /// A timeline run; dropped if that run was stopped or restarted before
    /// the list is dispatched.
    Timeline {
        timeline: TimelineId,
        run: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Queued {
    pub list: ActionListId,
    pub origin: Origin,
}

impl From<TimelineFiring> for Queued {
    fn from(firing: TimelineFiring) -> Self {
        Queued {
            list: firing.list,
            origin: Origin::Timeline {
                timeline: firing.timeline,
                run: firing.run,
            },
        }
    }
}

/// FIFO of action lists waiting to be dispatched this tick.
#[derive(Debug, Clone, Default)]
pub struct DispatchQueue {
    items: VecDeque<Queued>,
}

impl DispatchQueue {
    pub fn push(&mut self, item: Queued) {
        self.items.push_back(item);
    }

    pub fn push_event(&mut self, list: ActionListId) {
        self.push(Queued {
            list,
            origin: Origin::Event,
        });
    }

    pub fn pop(&mut self) -> Option<Queued> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether the rest of the current list should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    /// The scene was reset; the rest of the list is dropped.
    Abort,
}

impl Runtime {
    /// Execute one action list in order.
    pub(crate) fn dispatch_list<H: SceneHost + ?Sized>(
        &mut self,
        list: ActionListId,
        host: &mut H,
    ) -> Flow {
        let bound = Arc::clone(&self.bound);
        for action in bound.list(list) {
            if self.dispatch_action(&bound, action, host) == Flow::Abort {
                return Flow::Abort;
            }
        }
        Flow::Continue
    }

    fn dispatch_action<H: SceneHost + ?Sized>(
        &mut self,
        bound: &BoundProject,
        action: &BoundAction,
        host: &mut H,
    ) -> Flow {
        match action {
            BoundAction::Object {
                target,
                duration,
                change,
            } => {
                let targets = match *target {
                    BoundTarget::Entity(id) => vec![id],
                    BoundTarget::Group(group, policy) => {
                        self.groups.resolve(&bound.group(group).members, policy)
                    }
                };
                for entity in targets {
                    self.apply_change(bound, entity, *duration, change, host);
                }
            }
            BoundAction::Timeline { timeline, change } => {
                if self.timelines.apply(*timeline, *change) {
                    tracing::debug!(
                        "timeline '{}': {:?}",
                        bound.timeline(*timeline).name,
                        change
                    );
                }
            }
            BoundAction::Sound { sound, change } => self.sound(bound, *sound, *change, host),
            BoundAction::Trigger { trigger, enable } => {
                tracing::debug!(
                    "trigger '{}' {}",
                    bound.trigger(*trigger).name,
                    if *enable { "enabled" } else { "disabled" }
                );
                self.triggers.set_enabled(*trigger, *enable);
            }
            BoundAction::MoveViewer {
                placement,
                relative,
                duration,
            } => {
                let current = self.scene.viewer;
                match self.end_transform(bound, placement, *relative, &current, false) {
                    Some(end) => self.set_or_transition(
                        (TransitionTarget::Viewer, Property::Transform),
                        TransitionValue::Transform(current),
                        TransitionValue::Transform(end),
                        *duration,
                        false,
                    ),
                    None => tracing::warn!("skipping viewer move with a degenerate rotation"),
                }
            }
            BoundAction::Reset => {
                self.restore_initial(host);
                return Flow::Abort;
            }
        }
        Flow::Continue
    }

    fn sound<H: SceneHost + ?Sized>(
        &mut self,
        bound: &BoundProject,
        sound: SoundId,
        change: SoundChange,
        host: &mut H,
    ) {
        match change {
            SoundChange::Play => {
                tracing::debug!("playing sound '{}'", bound.sound(sound).name);
                host.play_sound(sound, bound.sound(sound));
                self.playing[sound.index()] = true;
            }
            SoundChange::Stop => {
                host.stop_sound(sound);
                self.playing[sound.index()] = false;
            }
        }
    }

    fn end_transform(
        &mut self,
        bound: &BoundProject,
        placement: &BoundPlacement,
        relative: bool,
        current: &w3d_core::Transform,
        own_axis: bool,
    ) -> Option<w3d_core::Transform> {
        if relative {
            self.resolver
                .relative(bound, &self.scene.entities, placement, current, own_axis)
        } else {
            self.resolver.resolve(bound, &self.scene.entities, placement)
        }
    }

    fn apply_change<H: SceneHost + ?Sized>(
        &mut self,
        bound: &BoundProject,
        entity: EntityId,
        duration: f64,
        change: &BoundChange,
        host: &mut H,
    ) {
        let target = TransitionTarget::Entity(entity);
        let state = *self.scene.entity(entity);
        match change {
            BoundChange::Visible(true) => {
                let start = if state.visible { state.opacity } else { 0.0 };
                let current = self.scene.entity_mut(entity);
                current.visible = true;
                current.opacity = start;
                self.scene.mark(target, Property::Visibility);
                self.set_or_transition(
                    (target, Property::Visibility),
                    TransitionValue::Scalar(start),
                    TransitionValue::Scalar(1.0),
                    duration,
                    false,
                );
            }
            BoundChange::Visible(false) => self.set_or_transition(
                (target, Property::Visibility),
                TransitionValue::Scalar(state.opacity),
                TransitionValue::Scalar(0.0),
                duration,
                true,
            ),
            BoundChange::Color(color) => self.set_or_transition(
                (target, Property::Color),
                TransitionValue::Color(state.color),
                TransitionValue::Color(*color),
                duration,
                false,
            ),
            BoundChange::Scale(scale) => self.set_or_transition(
                (target, Property::Scale),
                TransitionValue::Scalar(state.scale),
                TransitionValue::Scalar(*scale),
                duration,
                false,
            ),
            BoundChange::Move {
                placement,
                relative,
            } => {
                let own_axis = bound.entity(entity).around_own_axis;
                match self.end_transform(bound, placement, *relative, &state.transform, own_axis) {
                    Some(end) => self.set_or_transition(
                        (target, Property::Transform),
                        TransitionValue::Transform(state.transform),
                        TransitionValue::Transform(end),
                        duration,
                        false,
                    ),
                    None => tracing::warn!(
                        "skipping move of '{}' with a degenerate rotation",
                        bound.entity(entity).name
                    ),
                }
            }
            BoundChange::Sound(change) => match bound.entity(entity).sound {
                Some(sound) => self.sound(bound, sound, *change, host),
                None => tracing::warn!("entity '{}' has no sound", bound.entity(entity).name),
            },
            BoundChange::Link(change) => {
                let fired = match change {
                    LinkChange::Enable => {
                        self.links.set_enabled(entity, true);
                        Vec::new()
                    }
                    LinkChange::Disable => {
                        self.links.set_enabled(entity, false);
                        Vec::new()
                    }
                    LinkChange::Activate => self.links.activate(bound, entity, true),
                    LinkChange::ActivateIfEnabled => self.links.activate(bound, entity, false),
                };
                for list in fired {
                    self.queue.push_event(list);
                }
            }
        }
    }

    /// Start a transition, or apply the end value at once when `duration`
    /// is zero. Either way any live transition on `key` is replaced.
    pub(crate) fn set_or_transition(
        &mut self,
        key: TransitionKey,
        start: TransitionValue,
        end: TransitionValue,
        duration: f64,
        hide_at_end: bool,
    ) {
        if duration <= self.config.time_epsilon {
            self.transitions.cancel(&key);
            self.apply_value(key, end);
            if hide_at_end {
                self.hide(key.0);
            }
            return;
        }
        let mut transition = Transition::new(start, end, duration);
        if hide_at_end {
            transition = transition.hiding();
        }
        self.transitions.insert(key, transition);
    }

    pub(crate) fn hide(&mut self, target: TransitionTarget) {
        if let TransitionTarget::Entity(entity) = target {
            self.scene.entity_mut(entity).visible = false;
            self.scene.mark(target, Property::Visibility);
        }
    }

    /// Write an interpolated or final value into the scene and mark it for flushing.
    pub(crate) fn apply_value(&mut self, key: TransitionKey, value: TransitionValue) {
        let (target, property) = key;
        match (target, property, value) {
            (TransitionTarget::Entity(id), Property::Transform, TransitionValue::Transform(t)) => {
                self.scene.entity_mut(id).transform = t;
                self.resolver.invalidate();
            }
            (TransitionTarget::Entity(id), Property::Color, TransitionValue::Color(c)) => {
                self.scene.entity_mut(id).color = c;
            }
            (TransitionTarget::Entity(id), Property::Visibility, TransitionValue::Scalar(o)) => {
                self.scene.entity_mut(id).opacity = o.clamp(0.0, 1.0);
            }
            (TransitionTarget::Entity(id), Property::Scale, TransitionValue::Scalar(s)) => {
                self.scene.entity_mut(id).scale = s;
            }
            (TransitionTarget::Viewer, Property::Transform, TransitionValue::Transform(t)) => {
                self.scene.viewer = t;
            }
            (target, property, value) => {
                tracing::warn!(
                    "ignoring {:?} for {} of {:?}",
                    value,
                    property,
                    target
                );
                return;
            }
        }
        self.scene.mark(target, property);
    }
}
