//! Simulation configuration and loading.

use std::path::Path;

use freerun_physics::{MovementConfig, MovementError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading a [`SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] MovementError),

    #[error("invalid simulation config: {0}")]
    Simulation(&'static str),
}

/// Game simulation configuration.
///
/// Missing fields take their defaults, so a config file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Overrides the level's kill plane height.
    pub kill_plane_y: Option<f32>,

    /// Mouse sensitivity (radians per 1000 pixels).
    pub mouse_sensitivity: f32,

    /// Named movement preset to start from, see [`MovementConfig::preset`].
    pub preset: Option<String>,

    /// Movement physics configuration.
    pub movement: MovementConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            kill_plane_y: None,
            mouse_sensitivity: 2.0,
            preset: None,
            movement: MovementConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON config.
    ///
    /// A `preset` replaces the movement block with the named preset.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        if let Some(name) = config.preset.as_deref() {
            config.movement = MovementConfig::preset(name)
                .ok_or(ConfigError::Simulation("unknown movement preset"))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("loading simulation config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Simulation("tick_rate must be at least 1"));
        }
        if self.kill_plane_y.is_some_and(|y| !y.is_finite()) {
            return Err(ConfigError::Simulation("kill_plane_y must be finite"));
        }
        self.movement.validate()?;
        Ok(())
    }

    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.delta_time() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimulationConfig::from_json_str(r#"{ "tick_rate": 120, "movement": { "gravity": 30.0 } }"#)
                .unwrap();

        assert_eq!(config.tick_rate, 120);
        assert_eq!(config.movement.gravity, 30.0);
        assert_eq!(config.movement.walk_speed, MovementConfig::default().walk_speed);
        assert_eq!(config.kill_plane_y, None);
    }

    #[test]
    fn test_preset_replaces_movement() {
        let config = SimulationConfig::from_json_str(r#"{ "preset": "competitive" }"#).unwrap();
        assert_eq!(config.movement, MovementConfig::competitive());

        let result = SimulationConfig::from_json_str(r#"{ "preset": "moon" }"#);
        assert!(matches!(result, Err(ConfigError::Simulation(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = SimulationConfig::from_json_str(r#"{ "movement": { "gravity": -1.0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = SimulationConfig::from_json_str(r#"{ "tick_rate": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Simulation(_))));

        let result = SimulationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = SimulationConfig::load("/nonexistent/freerun.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
