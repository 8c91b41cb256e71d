//! # E220 Radio Driver
//!
//! High-level driver for EBYTE E220 UART LoRa modules. It owns the UART and
//! the M0/M1/AUX lines and exposes the two things an application does with the
//! module: exchange newline-terminated messages, and read or write the
//! configuration registers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │        Application Layer        │
//! ├─────────────────────────────────┤
//! │     E220Driver (this file)      │
//! ├────────────────┬────────────────┤
//! │ ModeController │ LineTransport  │──── config::codec
//! ├────────────────┼────────────────┤
//! │   ModePins     │   SerialIo     │
//! └────────────────┴────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use e220_rs::driver::{DriverConfig, E220Driver};
//! use e220_rs::mock::{MockClock, MockPins, MockSerialPort, ReadyScript};
//!
//! let port = MockSerialPort::new();
//! let mut driver = E220Driver::new(
//!     MockPins::new(ReadyScript::Ready),
//!     port.clone(),
//!     MockClock::new(),
//!     DriverConfig::default(),
//! )?;
//!
//! driver.send_line("hello")?;
//! assert_eq!(port.get_tx_data(), b"hello\n");
//! assert_eq!(driver.receive_line()?, None);
//! # Ok::<(), e220_rs::E220Error>(())
//! ```
//!
//! The driver does no scheduling of its own: call
//! [`receive_line`](E220Driver::receive_line) from the application loop. It is
//! not internally synchronized; share it behind a mutex if needed.

use crate::config::{codec, Configuration, RegisterBlock};
use crate::constants::{
    CMD_READ_REGISTERS, CMD_WRITE_REGISTERS, COMMAND_HEADER_LEN, DEFAULT_FRAME_TIMEOUT_MS,
    DEFAULT_MAX_LINE_LEN, DEFAULT_READY_POLL_INTERVAL_MS, DEFAULT_READY_TIMEOUT_MS,
    DEFAULT_SETTLE_DELAY_MS, DEFAULT_STARTUP_DELAY_MS, READ_RESPONSE_LEN, REGISTER_BLOCK_LEN,
    REG_START_ADDRESS, WRITE_ACK_LEN,
};
use crate::error::E220Error;
use crate::hal::{Clock, ModePins};
use crate::mode::{Mode, ModeController, ModeTiming, Readiness};
use crate::transport::{LineTransport, SerialIo};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Serialize `Duration` fields as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// Timing and buffering configuration for [`E220Driver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Sleep before and after driving M0/M1
    #[serde(with = "duration_ms", rename = "settle_delay_ms")]
    pub settle_delay: Duration,
    /// Longest wait for AUX after a mode change
    #[serde(with = "duration_ms", rename = "ready_timeout_ms")]
    pub ready_timeout: Duration,
    /// AUX sampling interval
    #[serde(with = "duration_ms", rename = "ready_poll_interval_ms")]
    pub ready_poll_interval: Duration,
    /// Longest wait for a register response
    #[serde(with = "duration_ms", rename = "frame_timeout_ms")]
    pub frame_timeout: Duration,
    /// Boot time allowed at construction
    #[serde(with = "duration_ms", rename = "startup_delay_ms")]
    pub startup_delay: Duration,
    /// Longest partial line kept while waiting for a newline
    pub max_line_len: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            ready_poll_interval: Duration::from_millis(DEFAULT_READY_POLL_INTERVAL_MS),
            frame_timeout: Duration::from_millis(DEFAULT_FRAME_TIMEOUT_MS),
            startup_delay: Duration::from_millis(DEFAULT_STARTUP_DELAY_MS),
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

impl DriverConfig {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    pub fn with_ready_poll_interval(mut self, interval: Duration) -> Self {
        self.ready_poll_interval = interval;
        self
    }

    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    pub fn with_max_line_len(mut self, len: usize) -> Self {
        self.max_line_len = len;
        self
    }

    fn mode_timing(&self) -> ModeTiming {
        ModeTiming {
            settle_delay: self.settle_delay,
            ready_timeout: self.ready_timeout,
            poll_interval: self.ready_poll_interval,
        }
    }
}

/// Driver for one E220 module.
///
/// ## Type Parameters
///
/// * `P` - M0/M1/AUX line access
/// * `S` - UART byte port
/// * `C` - time source for delays and timeouts
pub struct E220Driver<P: ModePins, S: SerialIo, C: Clock + Clone> {
    controller: ModeController<P, C>,
    transport: LineTransport<S, C>,
    last_readiness: Readiness,
}

impl<P: ModePins, S: SerialIo, C: Clock + Clone> E220Driver<P, S, C> {
    /// Take ownership of the hardware and bring the module up in Normal mode.
    ///
    /// A module that never signals ready is logged, not rejected; see
    /// [`last_readiness`](Self::last_readiness).
    pub fn new(pins: P, io: S, clock: C, config: DriverConfig) -> Result<Self, E220Error> {
        let mut controller = ModeController::new(pins, clock.clone(), config.mode_timing());
        let mut transport = LineTransport::new(io, clock)
            .with_frame_timeout(config.frame_timeout)
            .with_max_line_len(config.max_line_len);

        let last_readiness = controller.initialize(&mut transport, config.startup_delay)?;
        log::info!(
            "E220 initialized in {} mode ({})",
            controller.current_mode(),
            if last_readiness.is_ready() { "ready" } else { "not ready" }
        );

        Ok(Self {
            controller,
            transport,
            last_readiness,
        })
    }

    /// Read the eight configuration registers.
    ///
    /// The module is left in Normal mode whether or not the read succeeds.
    pub fn read_configuration(&mut self) -> Result<Configuration, E220Error> {
        self.with_program_mode(|transport| {
            let request = [CMD_READ_REGISTERS, REG_START_ADDRESS, REGISTER_BLOCK_LEN as u8];
            transport.write_bytes(&request)?;

            let response = transport.read_exact(READ_RESPONSE_LEN)?;
            let (header, payload) = response.split_at(COMMAND_HEADER_LEN);
            if header != &request[..] {
                log::warn!(
                    "Unexpected read-registers header {} (sent {})",
                    hex::encode(header),
                    hex::encode(request)
                );
            }

            let block = RegisterBlock::try_from(payload)?;
            log::debug!("Read registers: {block}");
            log::trace!("{}", block.register_dump());
            Ok(codec::decode(&block))
        })
    }

    /// Write `cfg` to the module's registers.
    ///
    /// The 8-byte acknowledgement is length-checked only. The module is left
    /// in Normal mode whether or not the write succeeds.
    pub fn write_configuration(&mut self, cfg: &Configuration) -> Result<(), E220Error> {
        let block = codec::encode(cfg)?;

        self.with_program_mode(|transport| {
            let mut frame = Vec::with_capacity(COMMAND_HEADER_LEN + REGISTER_BLOCK_LEN);
            frame.extend_from_slice(&[
                CMD_WRITE_REGISTERS,
                REG_START_ADDRESS,
                REGISTER_BLOCK_LEN as u8,
            ]);
            frame.extend_from_slice(block.as_bytes());
            log::debug!("Write registers: {block}");
            transport.write_bytes(&frame)?;

            let ack = transport.read_exact(WRITE_ACK_LEN)?;
            log::debug!("Write acknowledged: {}", hex::encode(&ack));
            Ok(())
        })
    }

    /// Write `cfg`, read it back and check every readable field matched.
    ///
    /// Returns the configuration as the module reports it (key reads as zero).
    pub fn apply_configuration(&mut self, cfg: &Configuration) -> Result<Configuration, E220Error> {
        self.write_configuration(cfg)?;
        let actual = self.read_configuration()?;
        match cfg.first_readable_mismatch(&actual) {
            None => Ok(actual),
            Some(field) => {
                log::warn!("Configuration read-back differs on {field}");
                Err(E220Error::VerifyMismatch { field })
            }
        }
    }

    /// Send one line of application data.
    ///
    /// Only Normal and WakeUp modes transmit; in PowerDown or Program mode the
    /// call fails with `WrongMode` and nothing is written. The driver rests in
    /// Normal between configuration operations.
    pub fn send_line(&mut self, text: &str) -> Result<(), E220Error> {
        let mode = self.current_mode();
        if !matches!(mode, Mode::Normal | Mode::WakeUp) {
            return Err(E220Error::WrongMode { mode });
        }
        log::debug!("Sending [{text}]");
        self.transport.write_line(text)
    }

    /// Next received line, or `None`. Never blocks.
    pub fn receive_line(&mut self) -> Result<Option<String>, E220Error> {
        if !self.transport.has_pending_line()? {
            return Ok(None);
        }
        self.transport.read_line()
    }

    /// Switch the module to another operating mode (e.g. WakeUp or PowerDown
    /// for wake-on-radio).
    pub fn set_mode(&mut self, mode: Mode) -> Result<Readiness, E220Error> {
        let readiness = self.controller.set_mode(mode, &mut self.transport)?;
        self.last_readiness = readiness;
        Ok(readiness)
    }

    /// Mode last applied to M0/M1
    pub fn current_mode(&self) -> Mode {
        self.controller.current_mode()
    }

    /// AUX outcome of the most recent transition
    pub fn last_readiness(&self) -> Readiness {
        self.last_readiness
    }

    /// Run `op` in Program mode and return to Normal on every path.
    fn with_program_mode<T>(
        &mut self,
        op: impl FnOnce(&mut LineTransport<S, C>) -> Result<T, E220Error>,
    ) -> Result<T, E220Error> {
        let result = match self.set_mode(Mode::Program) {
            Ok(_) => op(&mut self.transport),
            Err(e) => Err(e),
        };
        let restored = self.set_mode(Mode::Normal);

        match (result, restored) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(restore_err)) => {
                log::error!("Could not restore {} mode after error: {restore_err}", Mode::Normal);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::Level;
    use crate::mock::{MockClock, MockPins, MockSerialPort, ReadyScript};

    fn driver(
        script: ReadyScript,
    ) -> (E220Driver<MockPins, MockSerialPort, MockClock>, MockPins, MockSerialPort) {
        let pins = MockPins::new(script);
        let port = MockSerialPort::new();
        let drv = E220Driver::new(
            pins.clone(),
            port.clone(),
            MockClock::new(),
            DriverConfig::default(),
        )
        .unwrap();
        (drv, pins, port)
    }

    #[test]
    fn test_new_forces_normal() {
        let (drv, pins, _port) = driver(ReadyScript::Ready);
        assert_eq!(drv.current_mode(), Mode::Normal);
        assert_eq!(pins.levels(), (Level::Low, Level::Low));
        assert!(drv.last_readiness().is_ready());
    }

    #[test]
    fn test_read_configuration_request_bytes() {
        let (mut drv, pins, port) = driver(ReadyScript::Ready);
        port.queue_reply(&[0xC1, 0x00, 0x08, 0x00, 0x00, 0x60, 0x03, 0x17, 0x00, 0x00, 0x00]);

        let cfg = drv.read_configuration().unwrap();

        assert_eq!(cfg, Configuration::default());
        assert_eq!(port.writes(), vec![vec![0xC1, 0x00, 0x08]]);
        assert_eq!(
            pins.history(),
            vec![Mode::Normal.levels(), Mode::Program.levels(), Mode::Normal.levels()]
        );
    }

    #[test]
    fn test_set_mode_power_down() {
        let (mut drv, pins, _port) = driver(ReadyScript::Ready);
        let readiness = drv.set_mode(Mode::PowerDown).unwrap();
        assert!(readiness.is_ready());
        assert_eq!(drv.current_mode(), Mode::PowerDown);
        assert_eq!(pins.levels(), (Level::Low, Level::High));
    }

    #[test]
    fn test_driver_config_json_ms() {
        let json = serde_json::to_value(DriverConfig::default()).unwrap();
        assert_eq!(json["settle_delay_ms"], 40);
        assert_eq!(json["ready_timeout_ms"], 1000);

        let cfg: DriverConfig = serde_json::from_str(r#"{"frame_timeout_ms": 250}"#).unwrap();
        assert_eq!(cfg.frame_timeout, Duration::from_millis(250));
        assert_eq!(cfg.settle_delay, Duration::from_millis(40));
    }
}
