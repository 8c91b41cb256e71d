//! # e220-rs - A Rust Driver for EBYTE E220 UART LoRa Modules
//!
//! The E220 family (E220-900T22D, E220-900T30D, ...) are LoRa transceivers
//! driven over a UART, with two mode-select lines (M0, M1) and a busy/ready
//! line (AUX). This crate owns those four connections and provides:
//!
//! - Mode switching (Normal, WakeUp, PowerDown, Program) with the settle/drain/
//!   AUX handshake the module needs
//! - Reading and writing the eight configuration registers, with a bit-exact
//!   codec between [`Configuration`] and the register block
//! - Sending and receiving newline-terminated application messages
//! - Mock hardware for testing without a module attached
//!
//! Delivery is at-most-once per call; acknowledgements and retransmission are
//! left to the module firmware or the application.
//!
//! ## Usage
//!
//! ```rust
//! use e220_rs::{Configuration, DriverConfig, E220Driver, TransmitPower};
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
//! let cfg = Configuration::default()
//!     .to_builder()
//!     .transmit_power(TransmitPower::Dbm30)
//!     .build();
//! port.queue_reply(&[0u8; 8]); // write acknowledgement
//! driver.write_configuration(&cfg)?;
//! # Ok::<(), e220_rs::E220Error>(())
//! ```
//!
//! On a Raspberry Pi, enable the `raspberry-pi` feature and build the pins and
//! UART with `hal::raspberry_pi::RaspberryPiHalBuilder`.

pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod hal;
pub mod logging;
pub mod mock;
pub mod mode;
pub mod transport;

pub use crate::error::E220Error;
pub use crate::logging::{init_logger, log_info};

pub use config::{
    AirDataRate, BaudRate, Configuration, ConfigurationBuilder, CryptKey, Parity, RegisterBlock,
    SubPacketSize, TransmissionMethod, TransmitPower, WorCycle,
};
pub use driver::{DriverConfig, E220Driver};
pub use hal::{Clock, Level, ModePins, SystemClock};
pub use mode::{Mode, ModeController, Readiness};
pub use transport::{LineTransport, SerialIo, SerialPortIo, SerialSettings};
