//! Virtual clock environment for deterministic tests.
//!
//! `SimEnv` is the simulation counterpart of the terminal client's system
//! environment. Time only moves when a test or a scripted step advances
//! it, so timeout behavior replays identically on every run.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use irie_core::Environment;

/// Milliseconds since simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimInstant(u64);

impl std::ops::Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Deterministic environment with a manually advanced clock.
///
/// Clones share the clock, so the app, the driver, and the test all see
/// the same time. The wall clock starts at the Unix epoch and moves with
/// the monotonic one.
#[derive(Clone, Default)]
pub struct SimEnv {
    millis: Arc<AtomicU64>,
}

impl SimEnv {
    /// Create an environment with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        self.millis.fetch_add(duration.as_millis() as u64, Ordering::SeqCst);
    }

    /// Time elapsed since simulation start.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.millis.load(Ordering::SeqCst))
    }

    fn wall_now(&self) -> DateTime<Utc> {
        DateTime::UNIX_EPOCH
            + chrono::Duration::milliseconds(self.millis.load(Ordering::SeqCst) as i64)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        // Sleeping advances virtual time instead of waiting on it.
        self.advance(duration);
        std::future::ready(())
    }
}
