//! Core daemon process — startup, serve loop, and shutdown.
//!
//! Lifecycle: refuse a double start (PID marker liveness check), bind the
//! loopback listener (a taken port is fatal), write the PID marker, force
//! the light to `idle` best-effort, serve until a termination signal or
//! internal stop, then best-effort power-off and marker removal.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast;
use tracing::{info, warn};

use aura_config::AuraConfig;

use crate::control::server::{ControlState, router};
use crate::hue::{ConfiguredLight, HueError, LightControl};
use crate::pidfile::PidFile;
use crate::state::{self, AuraState};

/// Shutdown signal sent via broadcast channel.
#[derive(Debug, Clone)]
pub struct ShutdownSignal;

/// Errors from the daemon runtime.
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon is already running (PID {0}); use \"aura stop\" first")]
    AlreadyRunning(u32),

    #[error("port {0} is already in use — is another aura daemon running? Try \"aura stop\" first")]
    PortInUse(u16),

    #[error("bridge client error: {0}")]
    Hue(#[from] HueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The aura daemon: single authority over one light.
pub struct Daemon {
    config: AuraConfig,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
}

impl Daemon {
    /// Create a new daemon instance with the given configuration.
    pub fn new(config: AuraConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Request a graceful shutdown. Idempotent: repeat requests while
    /// already stopping are ignored.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(ShutdownSignal);
    }

    /// Get a reference to the daemon's configuration.
    pub fn config(&self) -> &AuraConfig {
        &self.config
    }

    /// Run until shutdown, driving the real bridge light.
    pub async fn run(&self, pidfile: &PidFile) -> Result<(), DaemonError> {
        let light = Arc::new(ConfiguredLight::new(&self.config)?);
        self.run_with_light(pidfile, light).await
    }

    /// Run until shutdown with an explicit light implementation.
    pub async fn run_with_light(
        &self,
        pidfile: &PidFile,
        light: Arc<dyn LightControl>,
    ) -> Result<(), DaemonError> {
        if pidfile.is_running() {
            // read() is Some here: is_running just confirmed a live PID.
            let pid = pidfile.read().unwrap_or_default();
            return Err(DaemonError::AlreadyRunning(pid));
        }

        // Bind before claiming the marker: a taken port means another
        // instance (or another program) owns it, and that is fatal.
        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                DaemonError::PortInUse(self.config.port)
            } else {
                DaemonError::Io(e)
            }
        })?;

        // Marker goes down after the liveness check and before the
        // control surface accepts connections, closing the double-start
        // race window.
        pidfile.write_current()?;

        // Registered up front so a signal during the initial light-set
        // still lands in the graceful path.
        let sigterm = signal(SignalKind::terminate())?;

        info!(
            bridge = %self.config.bridge.ip,
            light = %self.config.light.name,
            port = self.config.port,
            "aura daemon starting"
        );

        // Force a known state. An unreachable bridge must not stop the
        // daemon from listening.
        match state::resolve(&self.config, AuraState::Idle) {
            Ok(target) => {
                if let Err(e) = light.apply(&target).await {
                    warn!(error = %e, "could not set initial idle state");
                }
            }
            Err(e) => warn!(error = %e, "could not resolve initial idle state"),
        }

        let control = Arc::new(ControlState::new(self.config.clone(), light.clone()));
        let app = router(control);
        let shutdown_rx = self.shutdown_tx.subscribe();

        info!(port = self.config.port, "control surface listening on 127.0.0.1");
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx, sigterm))
            .await?;

        // Stopping: best-effort power-off. An unreachable bridge must not
        // keep resources held.
        if let Err(e) = light
            .power_off(state::transition_time(self.config.transition_ms))
            .await
        {
            warn!(error = %e, "could not turn light off during shutdown");
        }
        pidfile.remove();
        info!("aura daemon stopped");
        Ok(())
    }
}

/// Resolve on the first of: internal stop request, SIGINT, SIGTERM.
async fn wait_for_shutdown(
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
    mut sigterm: tokio::signal::unix::Signal,
) {
    tokio::select! {
        _ = shutdown_rx.recv() => {
            info!("stop requested, shutting down");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, shutting down");
        }
    }
}
