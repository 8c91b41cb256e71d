//! # Hardware Abstraction Layer for the E220 Control Lines
//!
//! The module is steered by two mode-select outputs (M0, M1) and reports
//! busy/idle on its AUX output. This module defines the trait the driver uses
//! for those three lines, plus the injected clock used for every delay and
//! timeout so the mode protocol can be exercised without hardware.

pub mod clock;

#[cfg(feature = "raspberry-pi")]
pub mod raspberry_pi;

pub use clock::{Clock, SystemClock};

#[cfg(feature = "raspberry-pi")]
pub use raspberry_pi::{ModePinConfig, RaspberryPiHalBuilder, RaspberryPiPins, RaspberryPiUart};

/// Logic level of a GPIO line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Control over the M0/M1 mode-select outputs and the AUX ready input.
///
/// GPIO writes are assumed not to fail once the pins have been claimed.
pub trait ModePins {
    /// Drive M0 and M1 to the given levels
    fn set_mode_select(&mut self, m0: Level, m1: Level);

    /// Sample the AUX line now. Low means the module is idle.
    ///
    /// Implementations must read the live pin level on every call.
    fn ready_line_is_low(&mut self) -> bool;
}

impl<T: ModePins + ?Sized> ModePins for &mut T {
    fn set_mode_select(&mut self, m0: Level, m1: Level) {
        (**self).set_mode_select(m0, m1)
    }

    fn ready_line_is_low(&mut self) -> bool {
        (**self).ready_line_is_low()
    }
}
