//! Monotonic time source and sleep used by every wait in the driver.

use std::thread;
use std::time::{Duration, Instant};

/// Injected time source.
///
/// `now` is monotonic time since an arbitrary origin fixed when the clock was
/// created. Clones share that origin.
pub trait Clock {
    fn now(&self) -> Duration;

    fn sleep(&self, duration: Duration);

    /// Time passed since an earlier `now()` reading.
    fn elapsed_since(&self, start: Duration) -> Duration {
        self.now().saturating_sub(start)
    }
}

/// Wall clock backed by [`Instant`] and [`thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
