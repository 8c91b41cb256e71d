//! Unit tests for the `E220Error` enum and its associated `Display` trait implementation.

use e220_rs::error::E220Error;
use e220_rs::Mode;

/// Tests that the `SerialPortError` variant is correctly formatted.
#[test]
fn test_serial_port_error() {
    let err = E220Error::SerialPortError("Test error".to_string());
    assert_eq!(err.to_string(), "Serial port error: Test error");
}

/// Tests that the `ShortRead` variant is correctly formatted.
#[test]
fn test_short_read_error() {
    let err = E220Error::ShortRead {
        expected: 11,
        received: vec![0xC1, 0x00, 0x08, 0x00, 0x00],
    };
    assert_eq!(err.to_string(), "Short read: expected 11 bytes, received 5");
}

/// Tests that the `TransportTimeout` variant is correctly formatted.
#[test]
fn test_transport_timeout_error() {
    let err = E220Error::TransportTimeout {
        expected: 8,
        waited_ms: 1000,
    };
    assert_eq!(
        err.to_string(),
        "Transport timeout: no data after 1000ms (expected 8 bytes)"
    );
}

/// Tests that the `ModuleNotReady` variant is correctly formatted.
#[test]
fn test_module_not_ready_error() {
    let err = E220Error::ModuleNotReady { waited_ms: 1000 };
    assert_eq!(err.to_string(), "Module not ready: AUX still high after 1000ms");
}

/// Tests that the `InvalidEnumValue` variant is correctly formatted.
#[test]
fn test_invalid_enum_value_error() {
    let err = E220Error::InvalidEnumValue {
        field: "baud_rate",
        value: 9,
    };
    assert_eq!(err.to_string(), "Invalid value 9 for field baud_rate");
}

/// Tests that the `VerifyMismatch` variant is correctly formatted.
#[test]
fn test_verify_mismatch_error() {
    let err = E220Error::VerifyMismatch { field: "channel" };
    assert_eq!(err.to_string(), "Configuration verify mismatch on channel");
}

/// Tests that the `WrongMode` variant is correctly formatted.
#[test]
fn test_wrong_mode_error() {
    let err = E220Error::WrongMode {
        mode: Mode::PowerDown,
    };
    assert_eq!(err.to_string(), "Cannot send application data in POWER DOWN mode");
}

/// Tests that io errors convert into serial port errors.
#[test]
fn test_io_error_conversion() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: E220Error = io.into();
    assert!(matches!(err, E220Error::SerialPortError(ref m) if m == "pipe closed"));
}

/// Only the frame timeouts count as timeouts.
#[test]
fn test_is_timeout() {
    assert!(E220Error::TransportTimeout {
        expected: 1,
        waited_ms: 0
    }
    .is_timeout());
    assert!(!E220Error::ModuleNotReady { waited_ms: 0 }.is_timeout());
    assert!(!E220Error::InvalidPayload("x".into()).is_timeout());
}
