//! The three-valued agent state and its mapping to light commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use aura_config::AuraConfig;

use crate::hue::color::{CieXy, hex_to_xy};

/// The agent lifecycle state the light represents.
///
/// The set is closed: nothing else is valid on the wire or in config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuraState {
    Idle,
    Thinking,
    NeedsInput,
}

impl AuraState {
    /// All states, in the order `demo` cycles them.
    pub const ALL: [AuraState; 3] = [AuraState::Idle, AuraState::Thinking, AuraState::NeedsInput];

    /// Wire/config name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuraState::Idle => "idle",
            AuraState::Thinking => "thinking",
            AuraState::NeedsInput => "needs_input",
        }
    }

    /// The configured hex color for this state.
    pub fn configured_hex<'a>(&self, config: &'a AuraConfig) -> &'a str {
        match self {
            AuraState::Idle => &config.colors.idle,
            AuraState::Thinking => &config.colors.thinking,
            AuraState::NeedsInput => &config.colors.needs_input,
        }
    }
}

impl fmt::Display for AuraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a state name outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid state {0:?} (use: idle, thinking, needs_input)")]
pub struct UnknownState(pub String);

impl FromStr for AuraState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(AuraState::Idle),
            "thinking" => Ok(AuraState::Thinking),
            "needs_input" => Ok(AuraState::NeedsInput),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// A fully resolved light command: chromaticity plus native brightness
/// and transition units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTarget {
    pub xy: CieXy,
    /// Native Hue brightness, 1–254.
    pub bri: u8,
    /// Transition in deciseconds.
    pub transition_time: u16,
}

/// A configured color entry that does not convert to a device color.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid color hex for state {state}: {hex:?}")]
pub struct InvalidColorConfig {
    pub state: AuraState,
    pub hex: String,
}

/// Convert a 0–100 brightness percentage to the device's 1–254 scale.
///
/// 0 clamps to the device minimum: the Hue protocol treats "off" as a
/// separate command, not a brightness level.
pub fn brightness_to_bri(percent: u8) -> u8 {
    let scaled = (f64::from(percent) / 100.0 * 254.0).round() as u8;
    scaled.clamp(1, 254)
}

/// Convert a transition in milliseconds to Hue deciseconds.
pub fn transition_time(ms: u64) -> u16 {
    (ms as f64 / 100.0).round() as u16
}

/// Resolve a state to the light command the daemon should issue for it.
pub fn resolve(config: &AuraConfig, state: AuraState) -> Result<LightTarget, InvalidColorConfig> {
    let hex = state.configured_hex(config);
    let xy = hex_to_xy(hex).ok_or_else(|| InvalidColorConfig {
        state,
        hex: hex.to_string(),
    })?;
    Ok(LightTarget {
        xy,
        bri: brightness_to_bri(config.brightness),
        transition_time: transition_time(config.transition_ms),
    })
}
