use w3d_core::{Color, Transform, Vec3};

use crate::bind::{BoundSound, EntityId, SoundId};

// ──────────────────────────────────────────────────────────────────────────────
// Per-frame input
// ──────────────────────────────────────────────────────────────────────────────

/// Tracked head pose of the viewer, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    pub position: Vec3,
    /// Gaze direction; need not be normalized.
    pub forward: Vec3,
}

/// Pointer state reported by the host for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerInput {
    /// Entity under the pointer.
    pub hovered: Option<EntityId>,
    /// Entity clicked this frame.
    pub selected: Option<EntityId>,
}

/// Everything the host reports for one tick.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Seconds since the previous tick.
    pub dt: f64,
    /// `None` while head tracking is unavailable.
    pub viewer: Option<ViewerPose>,
    /// Entities moved by the host (physics, grabbing) since the last tick.
    pub moved: Vec<(EntityId, Transform)>,
    pub pointer: PointerInput,
}

impl FrameInput {
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            ..Self::default()
        }
    }

    pub fn with_viewer(mut self, position: Vec3, forward: Vec3) -> Self {
        self.viewer = Some(ViewerPose { position, forward });
        self
    }

    pub fn hovering(mut self, entity: EntityId) -> Self {
        self.pointer.hovered = Some(entity);
        self
    }

    pub fn selecting(mut self, entity: EntityId) -> Self {
        self.pointer.hovered = Some(entity);
        self.pointer.selected = Some(entity);
        self
    }

    pub fn moving(mut self, entity: EntityId, transform: Transform) -> Self {
        self.moved.push((entity, transform));
        self
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Host contract
// ──────────────────────────────────────────────────────────────────────────────

/// The rendering/audio engine driven by the runtime.
///
/// The runtime only ever requests mutations; every method defaults to a no-op
/// so a host implements just what it renders.
pub trait SceneHost {
    fn set_transform(&mut self, _entity: EntityId, _transform: Transform) {}

    fn set_color(&mut self, _entity: EntityId, _color: Color) {}

    fn set_visibility(&mut self, _entity: EntityId, _visible: bool, _opacity: f32) {}

    fn set_scale(&mut self, _entity: EntityId, _scale: f32) {}

    fn set_viewer_transform(&mut self, _transform: Transform) {}

    /// `None` removes the highlight.
    fn set_link_highlight(&mut self, _entity: EntityId, _color: Option<Color>) {}

    fn play_sound(&mut self, _sound: SoundId, _clip: &BoundSound) {}

    fn stop_sound(&mut self, _sound: SoundId) {}
}

/// A mutation request, as recorded by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    SetTransform(EntityId, Transform),
    SetColor(EntityId, Color),
    SetVisibility(EntityId, bool, f32),
    SetScale(EntityId, f32),
    SetViewerTransform(Transform),
    SetLinkHighlight(EntityId, Option<Color>),
    PlaySound(SoundId),
    StopSound(SoundId),
}

/// A host that records every request, for tests and headless playback.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub commands: Vec<HostCommand>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the commands recorded so far.
    pub fn drain(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl SceneHost for RecordingHost {
    fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.commands.push(HostCommand::SetTransform(entity, transform));
    }

    fn set_color(&mut self, entity: EntityId, color: Color) {
        self.commands.push(HostCommand::SetColor(entity, color));
    }

    fn set_visibility(&mut self, entity: EntityId, visible: bool, opacity: f32) {
        self.commands
            .push(HostCommand::SetVisibility(entity, visible, opacity));
    }

    fn set_scale(&mut self, entity: EntityId, scale: f32) {
        self.commands.push(HostCommand::SetScale(entity, scale));
    }

    fn set_viewer_transform(&mut self, transform: Transform) {
        self.commands.push(HostCommand::SetViewerTransform(transform));
    }

    fn set_link_highlight(&mut self, entity: EntityId, color: Option<Color>) {
        self.commands.push(HostCommand::SetLinkHighlight(entity, color));
    }

    fn play_sound(&mut self, sound: SoundId, _clip: &BoundSound) {
        self.commands.push(HostCommand::PlaySound(sound));
    }

    fn stop_sound(&mut self, sound: SoundId) {
        self.commands.push(HostCommand::StopSound(sound));
    }
}
