//=========================================================================
// Logging
//=========================================================================
//
// Installs `env_logger` as the `log` backend.
//
//=========================================================================

//=== External Dependencies ===============================================

use env_logger::{Builder, Env};

//=== Public API ==========================================================

/// Installs the logger with `level` as default filter. `RUST_LOG` still
/// takes precedence.
///
/// Returns false if a logger was already installed.
pub fn init_logging(level: &str) -> bool {
    Builder::from_env(Env::default().default_filter_or(level))
        .try_init()
        .is_ok()
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_installation_is_refused() {
        init_logging("debug");
        assert!(!init_logging("debug"));
    }
}
