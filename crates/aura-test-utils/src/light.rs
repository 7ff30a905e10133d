//! A fake [`LightControl`] that records what the daemon asked for.
//!
//! The suppression and shutdown behavior of the control server is all
//! about *which* device commands get issued; this fake counts them.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use aura_core::BoxFuture;
use aura_core::hue::{HueError, LightControl};
use aura_core::state::LightTarget;

/// In-memory light: counts commands, optionally fails every call.
pub struct FakeLight {
    apply_count: AtomicUsize,
    power_off_count: AtomicUsize,
    last_target: Mutex<Option<LightTarget>>,
    fail: bool,
}

impl FakeLight {
    /// A light that accepts every command.
    pub fn new() -> Self {
        Self {
            apply_count: AtomicUsize::new(0),
            power_off_count: AtomicUsize::new(0),
            last_target: Mutex::new(None),
            fail: false,
        }
    }

    /// A light whose every command fails, as if the bridge were down.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    /// How many color commands were issued.
    pub fn apply_count(&self) -> usize {
        self.apply_count.load(Ordering::SeqCst)
    }

    /// How many power-off commands were issued.
    pub fn power_off_count(&self) -> usize {
        self.power_off_count.load(Ordering::SeqCst)
    }

    /// The most recent color command, if any.
    pub fn last_target(&self) -> Option<LightTarget> {
        *self.last_target.lock().unwrap()
    }

    fn outcome(&self) -> Result<(), HueError> {
        if self.fail {
            Err(HueError::Bridge("fake bridge is down".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for FakeLight {
    fn default() -> Self {
        Self::new()
    }
}

impl LightControl for FakeLight {
    fn apply<'a>(&'a self, target: &'a LightTarget) -> BoxFuture<'a, Result<(), HueError>> {
        self.apply_count.fetch_add(1, Ordering::SeqCst);
        *self.last_target.lock().unwrap() = Some(*target);
        let result = self.outcome();
        Box::pin(async move { result })
    }

    fn power_off(&self, _transition_time: u16) -> BoxFuture<'_, Result<(), HueError>> {
        self.power_off_count.fetch_add(1, Ordering::SeqCst);
        let result = self.outcome();
        Box::pin(async move { result })
    }
}
