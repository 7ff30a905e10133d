//! Wire types for the control surface.
//!
//! Serialized as JSON over the loopback socket. Both the server (daemon)
//! and the client (CLI, hook notifier) use these types.

use serde::{Deserialize, Serialize};

use crate::state::AuraState;

/// Body of `POST /state`. Exactly one recognized field; the state is
/// constrained to the closed [`AuraState`] set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRequest {
    pub state: AuraState,
}

/// Successful `POST /state` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub ok: bool,
    pub state: AuraState,
}

/// `GET /status` reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub state: AuraState,
    pub light: String,
    pub bridge: String,
}

/// Generic error reply for any 4xx/5xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
