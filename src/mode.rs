//! # Mode Controller
//!
//! The E220 has four operating modes selected by the M0/M1 lines:
//!
//! | Mode      | M0   | M1   |
//! |-----------|------|------|
//! | Normal    | low  | low  |
//! | WakeUp    | high | low  |
//! | PowerDown | low  | high |
//! | Program   | high | high |
//!
//! A transition is a fixed handshake: settle, drive the lines, settle again,
//! discard whatever the module printed meanwhile, then poll AUX until it goes
//! low. A readiness timeout is reported, not treated as failure: the lines
//! have been switched and the module is frequently usable anyway.

use crate::constants::{
    DEFAULT_READY_POLL_INTERVAL_MS, DEFAULT_READY_TIMEOUT_MS, DEFAULT_SETTLE_DELAY_MS,
};
use crate::error::E220Error;
use crate::hal::{Clock, Level, ModePins};
use crate::transport::{LineTransport, SerialIo};
use std::fmt;
use std::time::Duration;

/// E220 operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Transparent UART <-> radio
    Normal,
    /// Transmit with a wake-up preamble for WOR receivers
    WakeUp,
    /// Radio off, WOR receive
    PowerDown,
    /// Register access over UART (9600 8N1)
    Program,
}

impl Mode {
    /// (M0, M1) levels selecting this mode
    pub fn levels(self) -> (Level, Level) {
        match self {
            Mode::Normal => (Level::Low, Level::Low),
            Mode::WakeUp => (Level::High, Level::Low),
            Mode::PowerDown => (Level::Low, Level::High),
            Mode::Program => (Level::High, Level::High),
        }
    }

    pub fn from_levels(m0: Level, m1: Level) -> Self {
        match (m0, m1) {
            (Level::Low, Level::Low) => Mode::Normal,
            (Level::High, Level::Low) => Mode::WakeUp,
            (Level::Low, Level::High) => Mode::PowerDown,
            (Level::High, Level::High) => Mode::Program,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Normal => "NORMAL",
            Mode::WakeUp => "WAKEUP",
            Mode::PowerDown => "POWER DOWN",
            Mode::Program => "PROGRAM",
        };
        f.write_str(name)
    }
}

/// Outcome of waiting for AUX after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// AUX went low after `waited`
    Ready { waited: Duration },
    /// AUX was still high when the timeout expired
    NotReady { waited: Duration },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    /// Treat a readiness timeout as an error.
    pub fn into_result(self) -> Result<(), E220Error> {
        match self {
            Readiness::Ready { .. } => Ok(()),
            Readiness::NotReady { waited } => Err(E220Error::ModuleNotReady {
                waited_ms: waited.as_millis() as u64,
            }),
        }
    }
}

/// Delays used by the mode handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTiming {
    /// Sleep before and after driving M0/M1
    pub settle_delay: Duration,
    /// Longest wait for AUX to go low
    pub ready_timeout: Duration,
    /// AUX sampling interval
    pub poll_interval: Duration,
}

impl Default for ModeTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_READY_POLL_INTERVAL_MS),
        }
    }
}

/// Sequences mode transitions on the M0/M1/AUX lines.
///
/// `set_mode` takes `&mut self`, so only one transition can be in flight.
pub struct ModeController<P: ModePins, C: Clock> {
    pins: P,
    clock: C,
    timing: ModeTiming,
    mode: Mode,
}

impl<P: ModePins, C: Clock> ModeController<P, C> {
    /// Wrap the pins without touching them; call [`initialize`](Self::initialize)
    /// to put the module into a known mode.
    pub fn new(pins: P, clock: C, timing: ModeTiming) -> Self {
        Self {
            pins,
            clock,
            timing,
            mode: Mode::Normal,
        }
    }

    /// Force Normal mode after power-up.
    ///
    /// Drives the lines immediately, then waits `startup_delay` for the module
    /// to boot before draining its banner output and checking AUX.
    pub fn initialize<S: SerialIo>(
        &mut self,
        transport: &mut LineTransport<S, C>,
        startup_delay: Duration,
    ) -> Result<Readiness, E220Error> {
        let (m0, m1) = Mode::Normal.levels();
        self.pins.set_mode_select(m0, m1);
        self.mode = Mode::Normal;
        log::debug!("Forced {} mode, waiting {:?} for start-up", self.mode, startup_delay);

        self.clock.sleep(startup_delay);
        transport.drain()?;
        Ok(self.wait_until_ready())
    }

    /// Switch to `target`.
    ///
    /// The lines always end up at `target`'s levels; a readiness timeout is
    /// returned as [`Readiness::NotReady`] and logged.
    pub fn set_mode<S: SerialIo>(
        &mut self,
        target: Mode,
        transport: &mut LineTransport<S, C>,
    ) -> Result<Readiness, E220Error> {
        log::debug!("Set {target} mode (from {})", self.mode);

        self.clock.sleep(self.timing.settle_delay);
        let (m0, m1) = target.levels();
        self.pins.set_mode_select(m0, m1);
        self.mode = target;
        self.clock.sleep(self.timing.settle_delay);

        transport.drain()?;
        Ok(self.wait_until_ready())
    }

    /// Poll AUX until it reads low or the ready timeout expires.
    pub fn wait_until_ready(&mut self) -> Readiness {
        let start = self.clock.now();
        loop {
            if self.pins.ready_line_is_low() {
                let waited = self.clock.elapsed_since(start);
                log::trace!("Module ready after {waited:?}");
                return Readiness::Ready { waited };
            }

            let waited = self.clock.elapsed_since(start);
            if waited >= self.timing.ready_timeout {
                log::warn!(
                    "AUX still high after {}ms in {} mode",
                    waited.as_millis(),
                    self.mode
                );
                return Readiness::NotReady { waited };
            }

            let remaining = self.timing.ready_timeout - waited;
            self.clock.sleep(self.timing.poll_interval.min(remaining));
        }
    }

    /// Last mode applied to the lines
    pub fn current_mode(&self) -> Mode {
        self.mode
    }

    pub fn timing(&self) -> &ModeTiming {
        &self.timing
    }
}
