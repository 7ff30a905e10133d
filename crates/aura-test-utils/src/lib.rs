#![deny(unsafe_code)]

//! Shared test utilities for the aura workspace.
//!
//! Provides reusable fixtures, config builders, a fake light, and tracing
//! helpers so that individual crate tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! aura-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod light;
pub mod tracing_setup;
