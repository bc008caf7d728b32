//! Environment abstraction for deterministic testing.
//!
//! Decouples client logic from system clocks. Production drivers use the
//! system clock; simulation drivers use a manually advanced clock so timeout
//! behavior is exactly reproducible.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Abstract environment providing monotonic and wall-clock time.
///
/// Implementations MUST guarantee that `now()` never goes backwards within a
/// single execution context.
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`; simulation
    /// environments use a virtual clock.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current monotonic time, for timeouts and pacing.
    fn now(&self) -> Self::Instant;

    /// Current wall-clock time, for message timestamps shown to users and
    /// sent on the wire.
    fn wall_now(&self) -> DateTime<Utc>;

    /// Sleeps for the specified duration.
    ///
    /// The only async method in the trait; used by driver loops, never by
    /// state machines.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
