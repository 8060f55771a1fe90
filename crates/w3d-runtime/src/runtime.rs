use std::sync::Arc;

use w3d_core::{Property, RuntimeConfig, Transform, W3dError, W3dResult};
use w3d_ir::Project;

use crate::bind::{bind, BoundProject, EntityId, TimelineId, TriggerId};
use crate::clock::RuntimeClock;
use crate::dispatch::{DispatchQueue, Origin, Queued};
use crate::group::GroupResolver;
use crate::host::{FrameInput, SceneHost};
use crate::link::LinkTracker;
use crate::placement::PlacementResolver;
use crate::state::{EntityState, SceneState, TransitionTarget};
use crate::timeline::TimelineScheduler;
use crate::transition::TransitionSet;
use crate::trigger::TriggerEvaluator;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Scene time after the tick, in seconds.
    pub time: f64,
    pub frame: u64,
    /// Action lists dispatched during the tick.
    pub dispatched: usize,
    /// True if the dispatch cascade hit `max_cascade` and the rest was dropped.
    pub truncated: bool,
    /// Transitions still running after the tick.
    pub active_transitions: usize,
}

/// Plays a bound project forward one frame at a time.
///
/// The runtime is single-threaded and never blocks: the host calls
/// [`Runtime::tick`] once per rendered frame and applies the mutation
/// requests it receives through [`SceneHost`].
pub struct Runtime {
    pub(crate) bound: Arc<BoundProject>,
    pub(crate) config: RuntimeConfig,
    pub(crate) clock: RuntimeClock,
    pub(crate) scene: SceneState,
    initial_entities: Vec<EntityState>,
    initial_viewer: Transform,
    pub(crate) resolver: PlacementResolver,
    pub(crate) groups: GroupResolver,
    pub(crate) triggers: TriggerEvaluator,
    pub(crate) links: LinkTracker,
    pub(crate) timelines: TimelineScheduler,
    pub(crate) transitions: TransitionSet,
    pub(crate) queue: DispatchQueue,
    /// Sounds started and not stopped since the last reset.
    pub(crate) playing: Vec<bool>,
    started: bool,
}

impl Runtime {
    /// Validate and bind `project`. Configuration errors are reported here,
    /// never during playback.
    pub fn new(project: &Project, config: &RuntimeConfig) -> W3dResult<Self> {
        if let Some(max) = config.max_delta {
            if !(max.is_finite() && max > 0.0) {
                return Err(W3dError::InvalidArgument(format!(
                    "max_delta must be positive, got {}",
                    max
                )));
            }
        }
        if !(config.time_epsilon.is_finite() && config.time_epsilon >= 0.0) {
            return Err(W3dError::InvalidArgument(format!(
                "time_epsilon must be non-negative, got {}",
                config.time_epsilon
            )));
        }
        if config.max_cascade == 0 {
            return Err(W3dError::InvalidArgument(
                "max_cascade must be at least 1".into(),
            ));
        }

        let bound = Arc::new(bind(project)?);
        let mut resolver = PlacementResolver::new(bound.frames.len());
        let (initial_entities, initial_viewer) = initial_state(&bound, &mut resolver);

        Ok(Self {
            config: config.clone(),
            clock: RuntimeClock::new(config.max_delta),
            scene: SceneState::new(initial_entities.clone(), initial_viewer),
            initial_entities,
            initial_viewer,
            resolver,
            groups: GroupResolver::new(config.rng_seed),
            triggers: TriggerEvaluator::new(&bound),
            links: LinkTracker::new(&bound),
            timelines: TimelineScheduler::new(bound.timelines.len()),
            transitions: TransitionSet::new(),
            queue: DispatchQueue::default(),
            playing: vec![false; bound.sounds.len()],
            started: false,
            bound,
        })
    }

    /// Reset everything to the initial scene, push the full state to the
    /// host, start autostart sounds and timelines, and dispatch whatever they
    /// fire at offset zero.
    pub fn start<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> TickReport {
        tracing::info!(
            "starting scene: {} entities, {} triggers, {} timelines",
            self.bound.entities.len(),
            self.bound.triggers.len(),
            self.bound.timelines.len()
        );
        self.started = true;
        self.clock.reset();
        self.restore_initial(host);
        let (dispatched, truncated) = self.cascade(host);
        self.transitions.settle();
        self.flush(host);
        self.report(dispatched, truncated)
    }

    /// Advance the scene by one frame.
    ///
    /// Starts the scene first if [`start`](Self::start) was never called.
    pub fn tick<H: SceneHost + ?Sized>(&mut self, input: &FrameInput, host: &mut H) -> TickReport {
        if !self.started {
            self.start(host);
        }
        let dt = self.clock.advance(input.dt);
        self.resolver.invalidate();

        // Host-driven movement wins over any transform transition in flight.
        for (entity, transform) in &input.moved {
            if entity.index() >= self.scene.entities.len() {
                continue;
            }
            self.transitions
                .cancel(&(TransitionTarget::Entity(*entity), Property::Transform));
            self.scene.entity_mut(*entity).transform = *transform;
        }
        if !input.moved.is_empty() {
            self.resolver.invalidate();
        }

        for list in self
            .triggers
            .evaluate(&self.bound, input.viewer.as_ref(), &self.scene)
        {
            self.queue.push_event(list);
        }

        for list in self.links.pointer(&self.bound, &input.pointer) {
            self.queue.push_event(list);
        }

        let epsilon = self.config.time_epsilon;
        for firing in self.timelines.advance(&self.bound.timelines, dt, epsilon) {
            self.queue.push(firing.into());
        }

        let (dispatched, truncated) = self.cascade(host);

        for step in self.transitions.advance(dt, epsilon) {
            self.apply_value(step.key, step.value);
            if step.finished {
                tracing::debug!("transition {:?} {} finished", step.key.0, step.key.1);
                if step.hide_at_end {
                    self.hide(step.key.0);
                }
            }
        }

        self.flush(host);
        self.report(dispatched, truncated)
    }

    /// Dispatch queued lists until nothing is left, polling timelines started
    /// along the way so their offset-zero lists run in the same tick.
    fn cascade<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> (usize, bool) {
        let epsilon = self.config.time_epsilon;
        let limit = self.config.max_cascade as usize;
        let mut dispatched = 0;
        loop {
            for firing in self.timelines.poll_started(&self.bound.timelines, epsilon) {
                self.queue.push(firing.into());
            }
            let Some(Queued { list, origin }) = self.queue.pop() else {
                break;
            };
            if let Origin::Timeline { timeline, run } = origin {
                if !self.timelines.is_current(timeline, run) {
                    tracing::debug!(
                        "dropping list from stopped timeline '{}'",
                        self.bound.timeline(timeline).name
                    );
                    continue;
                }
            }
            if dispatched >= limit {
                tracing::warn!(
                    "dispatch cascade hit the limit of {} lists; dropping {} queued list(s)",
                    limit,
                    self.queue.len() + 1
                );
                self.queue.clear();
                return (dispatched, true);
            }
            dispatched += 1;
            self.dispatch_list(list, host);
        }
        (dispatched, false)
    }

    /// Restore the initial scene and restart what starts with it. Queued
    /// lists are discarded.
    pub(crate) fn restore_initial<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        if self.started && self.clock.frame() > 0 {
            tracing::info!("resetting scene at {}", self.clock.timestamp());
        }
        let bound = Arc::clone(&self.bound);

        self.scene = SceneState::new(self.initial_entities.clone(), self.initial_viewer);
        self.scene.mark_all();
        self.resolver.invalidate();
        self.transitions.clear();
        self.queue.clear();
        self.timelines.reset();
        self.triggers.reset(&bound);
        self.links.reset(&bound);

        for sound in bound.sound_ids() {
            if std::mem::replace(&mut self.playing[sound.index()], false) {
                host.stop_sound(sound);
            }
        }
        for sound in bound.sound_ids() {
            if bound.sound(sound).autostart {
                host.play_sound(sound, bound.sound(sound));
                self.playing[sound.index()] = true;
            }
        }
        for timeline in bound.timeline_ids() {
            if bound.timeline(timeline).start_immediately {
                tracing::debug!("starting timeline '{}'", bound.timeline(timeline).name);
                self.timelines.start(timeline);
            }
        }
    }

    /// Send every changed value to the host once, then link highlights.
    fn flush<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        for (target, property) in self.scene.take_dirty() {
            match target {
                TransitionTarget::Entity(id) => {
                    let state = self.scene.entity(id);
                    match property {
                        Property::Transform => host.set_transform(id, state.transform),
                        Property::Color => host.set_color(id, state.color),
                        Property::Visibility => {
                            host.set_visibility(id, state.visible, state.opacity)
                        }
                        Property::Scale => host.set_scale(id, state.scale),
                    }
                }
                TransitionTarget::Viewer => host.set_viewer_transform(self.scene.viewer),
            }
        }
        self.links.flush(&self.bound, host);
    }

    fn report(&self, dispatched: usize, truncated: bool) -> TickReport {
        TickReport {
            time: self.clock.now(),
            frame: self.clock.frame(),
            dispatched,
            truncated,
            active_transitions: self.transitions.len(),
        }
    }

    // --- Read access for hosts ---

    pub fn bound(&self) -> &BoundProject {
        &self.bound
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.bound.entity_id(name)
    }

    pub fn entity_name(&self, id: EntityId) -> Option<&str> {
        self.bound.entities.get(id.index()).map(|e| e.name.as_str())
    }

    pub fn entity_state(&self, id: EntityId) -> Option<&EntityState> {
        self.scene.entities.get(id.index())
    }

    pub fn viewer_transform(&self) -> Transform {
        self.scene.viewer
    }

    pub fn timeline_id(&self, name: &str) -> Option<TimelineId> {
        self.bound.timeline_id(name)
    }

    pub fn timeline_running(&self, id: TimelineId) -> bool {
        id.index() < self.bound.timelines.len() && self.timelines.is_running(id)
    }

    pub fn trigger_id(&self, name: &str) -> Option<TriggerId> {
        self.bound.trigger_id(name)
    }

    pub fn trigger_enabled(&self, id: TriggerId) -> bool {
        id.index() < self.bound.triggers.len() && self.triggers.is_enabled(id)
    }

    pub fn link_enabled(&self, id: EntityId) -> bool {
        self.links.is_enabled(id)
    }

    pub fn link_clicks(&self, id: EntityId) -> Option<u32> {
        self.links.clicks(id)
    }

    pub fn active_transitions(&self) -> usize {
        self.transitions.len()
    }
}

/// Resolve every entity's declared placement in dependency order.
fn initial_state(
    bound: &BoundProject,
    resolver: &mut PlacementResolver,
) -> (Vec<EntityState>, Transform) {
    let mut entities: Vec<EntityState> = bound
        .entities
        .iter()
        .map(|e| EntityState {
            transform: Transform::IDENTITY,
            color: e.color,
            visible: e.visible,
            opacity: if e.visible { 1.0 } else { 0.0 },
            scale: e.scale,
        })
        .collect();
    for &id in &bound.resolve_order {
        let placement = &bound.entity(id).placement;
        let transform = match resolver.resolve(bound, &entities, placement) {
            Some(t) => t,
            None => {
                tracing::warn!(
                    "entity '{}' has a degenerate rotation; keeping its frame orientation",
                    bound.entity(id).name
                );
                resolver.resolve_lenient(bound, &entities, placement)
            }
        };
        entities[id.index()].transform = transform;
        resolver.invalidate();
    }
    let viewer = resolver.resolve_lenient(bound, &entities, &bound.viewer);
    (entities, viewer)
}
