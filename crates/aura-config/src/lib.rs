#![deny(unsafe_code)]

//! Configuration loading, validation, and per-user paths for aura.
//!
//! Loads the TOML configuration file written by `aura setup` and validates
//! it against the expected schema. Provides the [`AuraConfig`] type as the
//! central configuration structure, and the [`paths`] module for the
//! well-known config and PID-marker locations.

/// Well-known per-user file locations.
pub mod paths;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default state colors, chosen to read as ambient / working / your-turn.
pub const DEFAULT_IDLE_COLOR: &str = "#E8DCC8";
pub const DEFAULT_THINKING_COLOR: &str = "#DA7756";
pub const DEFAULT_NEEDS_INPUT_COLOR: &str = "#E3A869";

/// Default brightness percentage.
pub const DEFAULT_BRIGHTNESS: u8 = 80;

/// Default color transition duration in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 1500;

/// Default control-server port.
pub const DEFAULT_PORT: u16 = 7685;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level aura configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuraConfig {
    /// Hue bridge address and credential.
    pub bridge: BridgeConfig,

    /// The light the daemon controls.
    pub light: LightConfig,

    /// Hex color per state.
    #[serde(default)]
    pub colors: ColorsConfig,

    /// Brightness percentage (0–100).
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Color transition duration in milliseconds.
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,

    /// Loopback port the control server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Hue bridge connection settings.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bridge IP address on the local network.
    pub ip: String,

    /// API username issued by the bridge during pairing.
    pub username: String,
}

/// The light selected during setup.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// Numeric light ID on the bridge.
    pub id: u32,

    /// Display name, for status output.
    pub name: String,
}

/// Hex color string for each state. All three entries are mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_idle_color")]
    pub idle: String,

    #[serde(default = "default_thinking_color")]
    pub thinking: String,

    #[serde(default = "default_needs_input_color")]
    pub needs_input: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            idle: default_idle_color(),
            thinking: default_thinking_color(),
            needs_input: default_needs_input_color(),
        }
    }
}

fn default_idle_color() -> String {
    DEFAULT_IDLE_COLOR.to_string()
}

fn default_thinking_color() -> String {
    DEFAULT_THINKING_COLOR.to_string()
}

fn default_needs_input_color() -> String {
    DEFAULT_NEEDS_INPUT_COLOR.to_string()
}

fn default_brightness() -> u8 {
    DEFAULT_BRIGHTNESS
}

fn default_transition_ms() -> u64 {
    DEFAULT_TRANSITION_MS
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Syntactic check for a 3- or 6-digit hex color, optional `#` prefix.
///
/// The full chromaticity conversion lives in the core crate; this only
/// guards the config schema against strings that could never convert.
pub fn is_hex_color(s: &str) -> bool {
    let h = s.strip_prefix('#').unwrap_or(s);
    (h.len() == 3 || h.len() == 6) && h.chars().all(|c| c.is_ascii_hexdigit())
}

impl AuraConfig {
    /// Load configuration from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AuraConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: AuraConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a TOML file, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.ip.is_empty() {
            return Err(ConfigError::Validation(
                "bridge.ip must not be empty".to_string(),
            ));
        }
        if self.bridge.username.is_empty() {
            return Err(ConfigError::Validation(
                "bridge.username must not be empty".to_string(),
            ));
        }
        if self.light.id == 0 {
            return Err(ConfigError::Validation(
                "light.id must be a positive integer".to_string(),
            ));
        }
        if self.brightness > 100 {
            return Err(ConfigError::Validation(format!(
                "brightness must be 0–100, got {}",
                self.brightness
            )));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "port must be non-zero".to_string(),
            ));
        }
        for (state, hex) in [
            ("idle", &self.colors.idle),
            ("thinking", &self.colors.thinking),
            ("needs_input", &self.colors.needs_input),
        ] {
            if !is_hex_color(hex) {
                return Err(ConfigError::Validation(format!(
                    "colors.{state} is not a valid hex color: {hex:?}"
                )));
            }
        }
        Ok(())
    }
}
