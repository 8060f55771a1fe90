use serde::{Deserialize, Serialize};
use std::fmt;

/// Span of scene time in fractional seconds. Never negative.
///
/// Serialized as a bare number of seconds, so `"duration": 1.5` in a project
/// file is a one-and-a-half second transition.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Duration {
    seconds: f64,
}

impl Duration {
    /// Negative and NaN inputs become zero.
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: if s > 0.0 { s } else { 0.0 },
        }
    }

    pub fn zero() -> Self {
        Self { seconds: 0.0 }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0.0
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::zero()
    }
}

impl From<f64> for Duration {
    fn from(seconds: f64) -> Self {
        Duration::from_seconds(seconds)
    }
}

impl From<Duration> for f64 {
    fn from(d: Duration) -> Self {
        d.seconds
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 1.0 {
            write!(f, "{:.0}ms", self.seconds * 1000.0)
        } else {
            write!(f, "{:.2}s", self.seconds)
        }
    }
}

/// A point on the runtime clock, measured from scene start.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp {
    seconds: f64,
}

impl Timestamp {
    pub fn from_seconds(s: f64) -> Self {
        Self {
            seconds: if s > 0.0 { s } else { 0.0 },
        }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }
}

impl fmt::Display for Timestamp {
    /// `mm:ss.mmm`, as printed in scene logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_ms = (self.seconds * 1000.0) as u64;
        write!(
            f,
            "{:02}:{:02}.{:03}",
            total_ms / 60_000,
            (total_ms % 60_000) / 1_000,
            total_ms % 1_000
        )
    }
}
