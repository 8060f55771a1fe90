//! # w3d-runtime
//!
//! Interactive playback of a Writing3D project. A [`Runtime`] binds a
//! validated [`w3d_ir::Project`] once, then on every frame:
//!
//! 1. advances the clock and takes in host-moved entities,
//! 2. evaluates triggers and pointer links for edge events,
//! 3. advances running timelines,
//! 4. dispatches the fired action lists (in the same tick, including lists
//!    from timelines those actions start),
//! 5. advances transitions and flushes changed values to the [`SceneHost`].

pub mod bind;
pub mod clock;
pub mod dispatch;
pub mod group;
pub mod host;
pub mod link;
pub mod placement;
pub mod runtime;
pub mod state;
pub mod timeline;
pub mod transition;
pub mod trigger;

pub use bind::{bind, BoundProject, EntityId, GroupId, SoundId, TimelineId, TriggerId};
pub use host::{FrameInput, HostCommand, PointerInput, RecordingHost, SceneHost, ViewerPose};
pub use runtime::{Runtime, TickReport};
pub use state::{EntityState, TransitionTarget};
