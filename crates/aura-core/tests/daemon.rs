//! Daemon lifecycle tests.
//!
//! These live as integration tests (not a unit-test module) because they
//! use `FakeLight` from `aura-test-utils`, which implements `LightControl`
//! from the externally built `aura-core` — a copy distinct from the
//! `cfg(test)` build a unit-test module would link against.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::net::TcpListener;

use aura_core::daemon::{Daemon, DaemonError};
use aura_core::{AuraState, PidFile};

use aura_test_utils::config::TestConfigBuilder;
use aura_test_utils::light::FakeLight;

fn pidfile_in(tmp: &TempDir) -> PidFile {
    PidFile::new(tmp.path().join("aura.pid"))
}

/// Pick a free loopback port by binding port 0 and releasing it.
async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn test_daemon_creation() {
    let config = TestConfigBuilder::new().port(7685).build();
    let daemon = Daemon::new(config);
    assert_eq!(daemon.config().port, 7685);
}

#[tokio::test]
async fn test_run_serves_and_shuts_down_cleanly() {
    aura_test_utils::tracing_setup::init_test_tracing();

    let tmp = TempDir::new().unwrap();
    let pidfile = pidfile_in(&tmp);
    let port = free_port().await;
    let light = Arc::new(FakeLight::new());

    let daemon = Arc::new(Daemon::new(TestConfigBuilder::new().port(port).build()));
    let handle = {
        let daemon = daemon.clone();
        let light = light.clone();
        let pid_path = tmp.path().join("aura.pid");
        tokio::spawn(async move {
            daemon
                .run_with_light(&PidFile::new(pid_path), light)
                .await
        })
    };

    // Wait for the control surface to come up.
    let client = aura_core::control::ControlClient::new(port).unwrap();
    let mut status = None;
    for _ in 0..50 {
        if let Ok(s) = client.status().await {
            status = Some(s);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    let status = status.expect("daemon never came up");
    assert_eq!(status.state, AuraState::Idle);
    assert!(pidfile.is_running());
    // Startup forced the idle color once.
    assert_eq!(light.apply_count(), 1);

    // Drive a transition through the live socket.
    let reply = client.set_state("thinking").await.unwrap();
    assert_eq!(reply.state, AuraState::Thinking);
    assert_eq!(light.apply_count(), 2);

    daemon.shutdown();
    handle.await.unwrap().unwrap();

    // Shutdown turned the light off and released the marker.
    assert_eq!(light.power_off_count(), 1);
    assert_eq!(pidfile.read(), None);
    assert!(!pidfile.is_running());
}

#[tokio::test]
async fn test_double_start_refused() {
    let tmp = TempDir::new().unwrap();
    let pidfile = pidfile_in(&tmp);
    // Marker held by this (live) process stands in for a running daemon.
    pidfile.write_current().unwrap();

    let daemon = Daemon::new(TestConfigBuilder::new().port(free_port().await).build());
    let result = daemon
        .run_with_light(&pidfile, Arc::new(FakeLight::new()))
        .await;
    assert!(matches!(result, Err(DaemonError::AlreadyRunning(_))));
    // The running instance's marker is left untouched.
    assert!(pidfile.is_running());
}

#[tokio::test]
async fn test_port_conflict_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let daemon = Daemon::new(TestConfigBuilder::new().port(port).build());
    let result = daemon
        .run_with_light(&pidfile_in(&tmp), Arc::new(FakeLight::new()))
        .await;
    assert!(matches!(result, Err(DaemonError::PortInUse(p)) if p == port));
    // The marker was never claimed.
    assert_eq!(pidfile_in(&tmp).read(), None);
}

#[tokio::test]
async fn test_startup_survives_unreachable_light() {
    let tmp = TempDir::new().unwrap();
    let port = free_port().await;
    let light = Arc::new(FakeLight::failing());

    let daemon = Arc::new(Daemon::new(TestConfigBuilder::new().port(port).build()));
    let handle = {
        let daemon = daemon.clone();
        let light = light.clone();
        let pid_path = tmp.path().join("aura.pid");
        tokio::spawn(
            async move { daemon.run_with_light(&PidFile::new(pid_path), light).await },
        )
    };

    let client = aura_core::control::ControlClient::new(port).unwrap();
    let mut up = false;
    for _ in 0..50 {
        if client.status().await.is_ok() {
            up = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert!(up, "daemon must listen even when the bridge is down");

    daemon.shutdown();
    // Shutdown must complete despite the power-off failing.
    handle.await.unwrap().unwrap();
}
