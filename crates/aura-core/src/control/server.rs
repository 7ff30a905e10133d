//! Control server — axum HTTP router over the loopback listener.
//!
//! The daemon is the single authority over the light; every state change
//! funnels through `POST /state` here. Transitions are serialized through
//! one async mutex held across the device call, so commands reach the
//! bridge in the order their requests were accepted, and a redundant
//! target (same as the current state) never issues a device command at
//! all — hooks fire often and mostly redundantly.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use tokio::sync::Mutex;
use tracing::{info, warn};

use aura_config::AuraConfig;

use super::types::*;
use crate::hue::LightControl;
use crate::state::{self, AuraState};

/// Shared state for the control routes.
///
/// `current` is the daemon's one mutable cell. It starts at `idle` and is
/// mutated only by `handle_set_state`, under the mutex.
pub struct ControlState {
    pub config: AuraConfig,
    pub light: Arc<dyn LightControl>,
    pub current: Mutex<AuraState>,
}

impl ControlState {
    pub fn new(config: AuraConfig, light: Arc<dyn LightControl>) -> Self {
        Self {
            config,
            light,
            current: Mutex::new(AuraState::Idle),
        }
    }
}

/// Build the axum router for the control surface.
pub fn router(state: Arc<ControlState>) -> axum::Router {
    axum::Router::new()
        .route("/state", post(handle_set_state))
        .route("/status", get(handle_status))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Permissive CORS for the local-only surface; answers any preflight
/// with `204` before routing.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// `POST /state` — drive the light to a new state.
///
/// The body is parsed by hand rather than through an extractor so that
/// malformed JSON and an out-of-set state each get a `400` with a JSON
/// error body, never a crash or a framework-shaped reply.
async fn handle_set_state(State(state): State<Arc<ControlState>>, body: String) -> Response {
    let value: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => return bad_request("invalid JSON body"),
    };
    let Some(requested) = value.get("state").and_then(serde_json::Value::as_str) else {
        return bad_request("missing \"state\" field");
    };
    let target: AuraState = match requested.parse() {
        Ok(target) => target,
        Err(_) => return bad_request("invalid state. Use: idle, thinking, needs_input"),
    };

    // Held across the device call: transitions apply in issue order and
    // never interleave.
    let mut current = state.current.lock().await;
    if *current != target {
        match state::resolve(&state.config, target) {
            Ok(command) => {
                match state.light.apply(&command).await {
                    Ok(()) => {
                        info!(state = %target, color = target.configured_hex(&state.config), "light updated")
                    }
                    Err(e) => {
                        // Non-fatal: the next request must not be blocked
                        // by one transient bridge failure.
                        warn!(
                            state = %target,
                            bridge = %state.config.bridge.ip,
                            error = %e,
                            "failed to update light"
                        );
                    }
                }
                // Optimistic commit: status reports intent, not confirmed
                // device acknowledgment.
                *current = target;
            }
            Err(e) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    (
        StatusCode::OK,
        Json(StateResponse {
            ok: true,
            state: *current,
        }),
    )
        .into_response()
}

/// `GET /status` — current state plus the identity of what's being driven.
async fn handle_status(State(state): State<Arc<ControlState>>) -> Json<StatusResponse> {
    let current = *state.current.lock().await;
    Json(StatusResponse {
        running: true,
        state: current,
        light: state.config.light.name.clone(),
        bridge: state.config.bridge.ip.clone(),
    })
}
