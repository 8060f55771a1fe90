use serde::{Deserialize, Serialize};

/// A named sound clip. Playback is delegated to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub name: String,
    pub filename: String,
    /// Play when the scene starts (and again after a reset).
    #[serde(default)]
    pub autostart: bool,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl Sound {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            autostart: false,
            looping: false,
            volume: 1.0,
        }
    }
}
