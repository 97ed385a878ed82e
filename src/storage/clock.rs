//! Time Source for Expiry Decisions
//!
//! The store never calls `Instant::now()` directly. It asks a [`Clock`],
//! so expiry can be driven by real time in production and by a manually
//! advanced clock when simulating TTL elapse.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// A monotonic source of "now".
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant of this clock.
    fn now(&self) -> Instant;
}

/// Wall-clock time via [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can hand one clone to the store
/// and keep another to advance it.
///
/// # Example
///
/// ```
/// use quicklink::storage::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_secs(5));
/// assert_eq!(clock.now() - start, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualClockState>>,
}

#[derive(Debug)]
struct ManualClockState {
    origin: Instant,
    elapsed: Duration,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualClockState {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.origin + state.elapsed
    }
}
