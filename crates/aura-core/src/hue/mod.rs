//! Hue bridge integration: color conversion, device client, discovery.

pub mod bridge;
pub mod client;
pub mod color;

use aura_config::AuraConfig;

use crate::BoxFuture;
use crate::state::LightTarget;

pub use client::{HueClient, HueError};

/// The single light the daemon is authorized to drive.
///
/// The daemon only ever issues two kinds of commands, so the seam is kept
/// that narrow; tests substitute a fake to observe what was issued.
pub trait LightControl: Send + Sync {
    /// Drive the light to the given color/brightness.
    fn apply<'a>(&'a self, target: &'a LightTarget) -> BoxFuture<'a, Result<(), HueError>>;

    /// Turn the light off with the given transition.
    fn power_off(&self, transition_time: u16) -> BoxFuture<'_, Result<(), HueError>>;
}

/// [`LightControl`] backed by a real bridge and the configured light ID.
pub struct ConfiguredLight {
    client: HueClient,
    light_id: u32,
}

impl ConfiguredLight {
    pub fn new(config: &AuraConfig) -> Result<Self, HueError> {
        Ok(Self {
            client: HueClient::new(&config.bridge.ip, &config.bridge.username)?,
            light_id: config.light.id,
        })
    }
}

impl LightControl for ConfiguredLight {
    fn apply<'a>(&'a self, target: &'a LightTarget) -> BoxFuture<'a, Result<(), HueError>> {
        Box::pin(self.client.set_light_state(self.light_id, target))
    }

    fn power_off(&self, transition_time: u16) -> BoxFuture<'_, Result<(), HueError>> {
        Box::pin(self.client.turn_off(self.light_id, transition_time))
    }
}
