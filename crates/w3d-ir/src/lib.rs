//! # w3d-ir
//!
//! The Writing3D feature tree: an immutable, declarative description of an
//! interactive scene. Entities, reference frames, groups, sounds, triggers,
//! links, timelines and the actions they fire.
//!
//! The tree is produced by a loader (or built programmatically with
//! [`builder`]) and validated once before a runtime binds it.

pub mod action;
pub mod builder;
pub mod entity;
pub mod group;
pub mod link;
pub mod placement;
pub mod project;
pub mod sound;
pub mod timeline;
pub mod trigger;
pub mod validate;

pub use action::{Action, LinkChange, ObjectChange, SoundChange, Target, TimelineChange};
pub use entity::{Content, ContentKind, Entity, LightKind, ShapeKind, TextAlign};
pub use group::Group;
pub use link::{Link, LinkActions};
pub use placement::{Placement, Rotation, CENTER};
pub use project::{FrameDecl, Project, ProjectSettings};
pub use sound::Sound;
pub use timeline::{TimedAction, Timeline};
pub use trigger::{BoxDirection, EventBox, MovementSource, Trigger, TriggerCondition};
pub use validate::validate_project;
