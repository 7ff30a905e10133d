//! Well-known per-user file locations.
//!
//! Everything aura persists lives under `~/.aura`: the TOML configuration
//! and the daemon's PID marker.

use std::path::PathBuf;

use crate::ConfigError;

/// Directory holding all persisted aura state.
pub fn aura_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".aura"))
        .ok_or_else(|| {
            ConfigError::Validation("could not determine home directory".to_string())
        })
}

/// Path to the persisted configuration file.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(aura_dir()?.join("config.toml"))
}

/// Path to the daemon's PID marker.
pub fn pid_path() -> Result<PathBuf, ConfigError> {
    Ok(aura_dir()?.join("aura.pid"))
}
