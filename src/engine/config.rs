//=========================================================================
// Engine Configuration
//=========================================================================
//
// File-backed engine settings.
//
// Every field has a default, so a config file only lists what it
// changes:
//
// ```toml
// tps = 30.0
// initial_state = "menu"
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::logging::init_logging;
use crate::core::error::ConfigError;

//=== EngineConfig ========================================================

/// Engine settings.
///
/// # Default Values
///
/// - **tps**: 60.0 (frames per second of [`Engine::run`](crate::Engine::run))
/// - **input_capacity**: 128 messages
/// - **draw_layers**: 1
/// - **initial_state**: none
/// - **log_level**: `"info"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tps: f64,
    pub input_capacity: usize,
    pub draw_layers: u32,
    pub initial_state: Option<String>,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            input_capacity: 128,
            draw_layers: 1,
            initial_state: None,
            log_level: "info".to_owned(),
        }
    }
}

impl EngineConfig {
    //--- Loading ----------------------------------------------------------

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Serializes the settings as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Installs the logger with `log_level` as default filter.
    pub fn init_logging(&self) -> bool {
        init_logging(&self.log_level)
    }

    //--- Validation -------------------------------------------------------

    /// Checks that `tps` and `input_capacity` are positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tps.is_nan() || self.tps <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "tps",
                reason: format!("must be positive, got {}", self.tps),
            });
        }
        if self.input_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "input_capacity",
                reason: "must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
