//! Loopback HTTP control surface.
//!
//! The daemon binds `127.0.0.1:<port>` and exposes a two-route JSON API.
//! Hook scripts and the CLI are the only intended callers; the permissive
//! CORS headers exist because this is a local-only trust boundary.

pub mod client;
pub mod server;
pub mod types;

pub use client::{ControlClient, ControlClientError};
pub use server::ControlState;
