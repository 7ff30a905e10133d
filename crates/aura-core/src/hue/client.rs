//! HTTPS client for the Hue bridge's light-state API.
//!
//! Bridges serve a self-signed certificate on the local network, so the
//! client deliberately skips certificate verification. Every call is
//! bounded by a short timeout; the daemon treats expiry as a failed
//! command, never as a hang.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::state::LightTarget;

/// Bound on any single round trip to the bridge.
const BRIDGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the bridge client.
#[derive(Debug, thiserror::Error)]
pub enum HueError {
    #[error("failed to build HTTPS client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to bridge {host} failed: {source}")]
    Transport {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bridge returned error: {0}")]
    Bridge(String),

    #[error("unexpected response from bridge: {0}")]
    Protocol(String),
}

/// Build a client that tolerates the bridge's self-signed certificate.
pub(crate) fn insecure_client() -> Result<reqwest::Client, HueError> {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(BRIDGE_TIMEOUT)
        .build()
        .map_err(HueError::Client)
}

/// Client bound to one bridge and one API credential.
pub struct HueClient {
    http: reqwest::Client,
    ip: String,
    username: String,
}

impl HueClient {
    pub fn new(ip: &str, username: &str) -> Result<Self, HueError> {
        Ok(Self {
            http: insecure_client()?,
            ip: ip.to_string(),
            username: username.to_string(),
        })
    }

    /// The bridge host this client talks to.
    pub fn host(&self) -> &str {
        &self.ip
    }

    fn state_url(&self, light_id: u32) -> String {
        format!(
            "https://{}/api/{}/lights/{}/state",
            self.ip, self.username, light_id
        )
    }

    /// PUT a state body and surface any error entry in the bridge's reply.
    ///
    /// The Hue API answers `200` even for application errors; failures
    /// arrive as `{"error": ...}` entries in the response array.
    async fn put_state(&self, light_id: u32, body: Value) -> Result<(), HueError> {
        debug!(light_id, %body, "bridge command");
        let response = self
            .http
            .put(self.state_url(light_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| HueError::Transport {
                host: self.ip.clone(),
                source: e,
            })?;

        let data: Value = response.json().await.map_err(|e| HueError::Transport {
            host: self.ip.clone(),
            source: e,
        })?;

        if let Some(items) = data.as_array() {
            for item in items {
                if let Some(err) = item.get("error") {
                    return Err(HueError::Bridge(err.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Drive the light to a color at the given brightness and transition.
    pub async fn set_light_state(
        &self,
        light_id: u32,
        target: &LightTarget,
    ) -> Result<(), HueError> {
        self.put_state(
            light_id,
            json!({
                "on": true,
                "xy": [target.xy.x, target.xy.y],
                "bri": target.bri,
                "transitiontime": target.transition_time,
            }),
        )
        .await
    }

    /// Turn the light off.
    pub async fn turn_off(&self, light_id: u32, transition_time: u16) -> Result<(), HueError> {
        self.put_state(
            light_id,
            json!({ "on": false, "transitiontime": transition_time }),
        )
        .await
    }

    /// Pulse the light once so the user can identify it during setup.
    pub async fn flash(&self, light_id: u32) -> Result<(), HueError> {
        self.put_state(light_id, json!({ "alert": "select" })).await
    }
}
