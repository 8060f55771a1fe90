use serde::{Deserialize, Serialize};

use crate::error::W3dResult;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Optional cap on a single frame delta (seconds). Unset means scene time
    /// always follows host time.
    pub max_delta: Option<f64>,
    /// Seed for random group selection. `None` draws from OS entropy.
    pub rng_seed: Option<u64>,
    /// Maximum number of action lists dispatched in a single tick.
    pub max_cascade: u32,
    /// Tolerance used when comparing elapsed time against offsets and durations.
    pub time_epsilon: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_delta: None,
            rng_seed: None,
            max_cascade: 1024,
            time_epsilon: 1e-9,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String, // tracing EnvFilter directive, e.g. "info" or "w3d_runtime=debug"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub fps: u32,
    pub seconds: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            seconds: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct W3dConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl W3dConfig {
    pub fn from_toml_str(contents: &str) -> W3dResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file(path: &std::path::Path) -> W3dResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = W3dConfig::from_toml_str("").unwrap();
        assert_eq!(config.runtime.max_delta, None);
        assert_eq!(config.runtime.rng_seed, None);
        assert_eq!(config.runtime.max_cascade, 1024);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.playback.fps, 60);
    }

    #[test]
    fn test_partial_sections() {
        let config = W3dConfig::from_toml_str(
            r#"
            [runtime]
            rng_seed = 7

            [logging]
            filter = "w3d_runtime=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.runtime.rng_seed, Some(7));
        assert_eq!(config.runtime.max_delta, None);
        assert_eq!(config.logging.filter, "w3d_runtime=debug");
    }

    #[test]
    fn test_max_delta_is_opt_in() {
        let config = W3dConfig::from_toml_str("[runtime]\nmax_delta = 0.5\n").unwrap();
        assert_eq!(config.runtime.max_delta, Some(0.5));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = W3dConfig::from_toml_str("[runtime\nmax_delta = ").unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }
}
