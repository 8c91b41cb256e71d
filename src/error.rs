//! # E220 Error Handling
//!
//! This module defines the E220Error enum, which represents the different error
//! types that can occur while talking to an E220 module.

use crate::mode::Mode;
use thiserror::Error;

/// Represents the different error types that can occur in the E220 crate.
#[derive(Debug, Error)]
pub enum E220Error {
    /// Fewer bytes than expected arrived before the frame timeout.
    /// `received` holds the bytes that did arrive.
    #[error("Short read: expected {expected} bytes, received {}", .received.len())]
    ShortRead { expected: usize, received: Vec<u8> },

    /// No byte at all arrived while a blocking frame was required.
    #[error("Transport timeout: no data after {waited_ms}ms (expected {expected} bytes)")]
    TransportTimeout { expected: usize, waited_ms: u64 },

    /// The AUX line did not settle low after a mode transition.
    #[error("Module not ready: AUX still high after {waited_ms}ms")]
    ModuleNotReady { waited_ms: u64 },

    /// A register field index outside its enum's cardinality.
    #[error("Invalid value {value} for field {field}")]
    InvalidEnumValue { field: &'static str, value: u8 },

    /// Application payload that the line protocol cannot carry.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Application data can only be sent in Normal or WakeUp mode.
    #[error("Cannot send application data in {mode} mode")]
    WrongMode { mode: Mode },

    /// Read-back after a write did not match what was written.
    #[error("Configuration verify mismatch on {field}")]
    VerifyMismatch { field: &'static str },

    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// GPIO setup failure.
    #[error("GPIO error: {0}")]
    Gpio(String),

    /// Configuration file could not be read, written or parsed.
    #[error("Configuration file error: {0}")]
    ConfigFile(String),
}

impl From<std::io::Error> for E220Error {
    fn from(err: std::io::Error) -> Self {
        E220Error::SerialPortError(err.to_string())
    }
}

impl E220Error {
    /// True for errors caused by the serial link timing out mid-frame.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            E220Error::ShortRead { .. } | E220Error::TransportTimeout { .. }
        )
    }
}
