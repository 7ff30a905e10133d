//! Typed client for the daemon's loopback control surface.
//!
//! Used by `aura status` for live state and by `aura notify` as a
//! fire-and-forget sender. Every request is bounded by a short timeout:
//! a hook invocation must never hang behind a wedged daemon.

use std::time::Duration;

use super::types::{ErrorResponse, StateResponse, StatusResponse};

/// Bound on any round trip to the daemon.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(2);

/// Errors from the control client.
#[derive(Debug, thiserror::Error)]
pub enum ControlClientError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("could not reach daemon on port {port}: {source}")]
    Unreachable {
        port: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("daemon returned error: {0}")]
    Daemon(String),

    #[error("failed to parse response: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Client bound to the loopback control port.
pub struct ControlClient {
    http: reqwest::Client,
    port: u16,
}

impl ControlClient {
    pub fn new(port: u16) -> Result<Self, ControlClientError> {
        let http = reqwest::Client::builder()
            .timeout(CONTROL_TIMEOUT)
            .build()
            .map_err(ControlClientError::Client)?;
        Ok(Self { http, port })
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// Query the daemon's current state.
    pub async fn status(&self) -> Result<StatusResponse, ControlClientError> {
        let response = self
            .http
            .get(self.url("/status"))
            .send()
            .await
            .map_err(|e| ControlClientError::Unreachable {
                port: self.port,
                source: e,
            })?;
        response.json().await.map_err(ControlClientError::Parse)
    }

    /// Request a state change. The state travels as a raw string; the
    /// daemon is the validator.
    pub async fn set_state(&self, state: &str) -> Result<StateResponse, ControlClientError> {
        let response = self
            .http
            .post(self.url("/state"))
            .json(&serde_json::json!({ "state": state }))
            .send()
            .await
            .map_err(|e| ControlClientError::Unreachable {
                port: self.port,
                source: e,
            })?;

        if !response.status().is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(err) => err.error,
                Err(e) => return Err(ControlClientError::Parse(e)),
            };
            return Err(ControlClientError::Daemon(message));
        }
        response.json().await.map_err(ControlClientError::Parse)
    }

    /// Best-effort send, bounded wait, result discarded.
    ///
    /// This is the whole contract of the hook notifier: the caller must
    /// never be made to wait for, or fail because of, the light.
    pub async fn notify(&self, state: &str) {
        let _ = self.set_state(state).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_daemon_error() {
        // Port 1 on loopback: nothing listens there.
        let client = ControlClient::new(1).unwrap();
        let result = client.status().await;
        assert!(matches!(
            result,
            Err(ControlClientError::Unreachable { port: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_notify_swallows_failure() {
        let client = ControlClient::new(1).unwrap();
        // Must not panic or error regardless of outcome.
        client.notify("thinking").await;
    }
}
