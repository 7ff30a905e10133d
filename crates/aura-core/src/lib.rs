#![deny(unsafe_code)]

//! aura core daemon runtime.
//!
//! Provides the long-running daemon that owns a single Hue light and maps an
//! agent's lifecycle state onto its color. The daemon exposes a loopback-only
//! HTTP control surface; everything else (CLI, hook scripts) talks to it
//! through that surface or signals it via the PID marker.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future — the standard return type for async
/// trait methods that require dynamic dispatch (`dyn Trait`).
///
/// Native `async fn` in traits produces opaque return types that are **not**
/// object-safe. Traits consumed via `Arc<dyn Trait>` must return a concrete
/// `Pin<Box<dyn Future>>` instead. This alias keeps those signatures readable.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Loopback HTTP control surface: server, typed client, wire types.
pub mod control;
/// Async daemon runtime: startup, serve loop, shutdown.
pub mod daemon;
/// Agent hook installation into the host tool's settings file.
pub mod hooks;
/// Hue bridge client, discovery/pairing, and color-space conversion.
pub mod hue;
/// PID-marker based process supervision.
pub mod pidfile;
/// AuraState and the state → light-command resolver.
pub mod state;

pub use daemon::Daemon;
pub use hue::{ConfiguredLight, HueClient, LightControl};
pub use pidfile::PidFile;
pub use state::AuraState;
