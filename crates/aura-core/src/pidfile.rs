//! PID-marker process supervision.
//!
//! A single small text file holds the daemon's PID. Absence means not
//! running; presence with a dead PID is a stale marker and is removed
//! opportunistically by the liveness check.

use std::fs;
use std::io;
use std::path::PathBuf;

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use aura_config::{ConfigError, paths};

/// Outcome of a stop request, so the CLI can report accurately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A live daemon was found and sent SIGTERM.
    Signaled(u32),
    /// No marker, or the marked process was already gone.
    NotRunning,
}

/// Handle to the PID marker at a fixed path.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker at the well-known per-user location.
    pub fn at_default_path() -> Result<Self, ConfigError> {
        Ok(Self::new(paths::pid_path()?))
    }

    /// Read the marked PID, if the marker exists and parses.
    pub fn read(&self) -> Option<u32> {
        let content = fs::read_to_string(&self.path).ok()?;
        content.trim().parse().ok()
    }

    /// Write the current process's PID. Called exactly once, after the
    /// liveness check and before the control surface starts accepting.
    pub fn write_current(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", std::process::id()))
    }

    /// Remove the marker. Missing file is fine.
    pub fn remove(&self) {
        let _ = fs::remove_file(&self.path);
    }

    /// Whether a daemon instance currently holds the marker.
    ///
    /// Probes the marked PID with a null signal; a dead PID means the
    /// marker is stale, which is cleaned up here.
    pub fn is_running(&self) -> bool {
        let Some(pid) = self.read() else {
            return false;
        };
        if process_alive(pid) {
            true
        } else {
            self.remove();
            false
        }
    }

    /// Send SIGTERM to the marked process.
    ///
    /// Always cleans the marker afterwards, even when the process was
    /// already gone — the signal handler in a live daemon would remove
    /// it itself, but a crashed daemon leaves it behind.
    pub fn signal_stop(&self) -> StopOutcome {
        let Some(pid) = self.read() else {
            return StopOutcome::NotRunning;
        };
        let result = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        self.remove();
        match result {
            Ok(()) => StopOutcome::Signaled(pid),
            Err(_) => StopOutcome::NotRunning,
        }
    }
}

/// Zero-cost existence probe: signal 0 delivers nothing.
fn process_alive(pid: u32) -> bool {
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn marker_in(dir: &TempDir) -> PidFile {
        PidFile::new(dir.path().join("aura.pid"))
    }

    /// PID of a process that has already exited.
    fn dead_pid() -> u32 {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        pid
    }

    #[test]
    fn test_absent_marker_means_not_running() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        assert_eq!(pidfile.read(), None);
        assert!(!pidfile.is_running());
    }

    #[test]
    fn test_write_current_then_running() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        pidfile.write_current().unwrap();
        assert_eq!(pidfile.read(), Some(std::process::id()));
        assert!(pidfile.is_running());
    }

    #[test]
    fn test_stale_marker_is_cleaned_up() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        std::fs::write(tmp.path().join("aura.pid"), format!("{}\n", dead_pid())).unwrap();

        assert!(!pidfile.is_running());
        // The stale file was removed opportunistically.
        assert_eq!(pidfile.read(), None);
    }

    #[test]
    fn test_garbage_marker_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        std::fs::write(tmp.path().join("aura.pid"), "not a pid\n").unwrap();
        assert_eq!(pidfile.read(), None);
        assert!(!pidfile.is_running());
    }

    #[test]
    fn test_stop_without_marker_reports_not_running() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        assert_eq!(pidfile.signal_stop(), StopOutcome::NotRunning);
    }

    #[test]
    fn test_stop_dead_process_cleans_marker() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        std::fs::write(tmp.path().join("aura.pid"), dead_pid().to_string()).unwrap();

        assert_eq!(pidfile.signal_stop(), StopOutcome::NotRunning);
        assert_eq!(pidfile.read(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let pidfile = marker_in(&tmp);
        pidfile.write_current().unwrap();
        pidfile.remove();
        pidfile.remove();
        assert!(!pidfile.is_running());
    }
}
