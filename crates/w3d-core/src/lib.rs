//! # w3d-core
//!
//! Core types and primitives for the Writing3D runtime.
//! This crate contains foundational types shared across all Writing3D crates:
//! transforms, colors, durations, shared enums, configuration, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod math;
pub mod time;
pub mod types;

pub use config::*;

pub use color::Color;
pub use error::{W3dError, W3dResult};
pub use math::{Quat, Transform, Vec3};
pub use time::{Duration, Timestamp};
pub use types::{FeatureKind, Property, SelectionPolicy};
