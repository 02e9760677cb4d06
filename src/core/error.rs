//=========================================================================
// Errors
//=========================================================================
//
// Error types for the operations whose failure a caller branches on.
// Everything else degrades gracefully and only logs.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::path::PathBuf;

//=== SystemError =========================================================

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    #[error("system {0:?} is not registered")]
    Unknown(String),

    #[error("system {0:?} is already loaded")]
    Duplicate(String),

    #[error("{0:?} is a reserved system name")]
    Reserved(String),
}

//=== StateError ==========================================================

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("state {0:?} is not registered")]
    Unknown(String),

    #[error("{0:?} is a reserved state name")]
    Reserved(String),
}

//=== ConfigError =========================================================

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
