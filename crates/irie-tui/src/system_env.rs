//! Production Environment implementation using system time.
//!
//! `SystemEnv` is the production implementation of the Environment trait.
//! Time advances naturally, so behavior is non-deterministic; the
//! simulation harness swaps in a virtual clock instead.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use irie_core::Environment;

/// Production environment using system clocks.
///
/// Uses `std::time::Instant::now()` for monotonic time, `chrono::Utc::now()`
/// for wall-clock timestamps, and `tokio::time::sleep()` for async sleeping.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[tokio::test]
    async fn sleep_waits() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_millis(50)).await;
        let elapsed = env.now() - start;

        assert!(elapsed >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}
