//! E220 Protocol Constants
//!
//! Command bytes, register geometry and timing defaults for the EBYTE E220
//! configuration protocol.

/// Write-registers command
pub const CMD_WRITE_REGISTERS: u8 = 0xC0;

/// Read-registers command
pub const CMD_READ_REGISTERS: u8 = 0xC1;

/// First configuration register (ADDH)
pub const REG_START_ADDRESS: u8 = 0x00;

/// Number of configuration registers exchanged per frame
pub const REGISTER_BLOCK_LEN: usize = 8;

/// Command header length on the wire (command, address, length)
pub const COMMAND_HEADER_LEN: usize = 3;

/// Read-registers response: echoed header plus payload
pub const READ_RESPONSE_LEN: usize = COMMAND_HEADER_LEN + REGISTER_BLOCK_LEN;

/// Write-registers acknowledgement length
pub const WRITE_ACK_LEN: usize = 8;

/// Application line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Base carrier frequency for channel 0, in MHz
pub const BASE_FREQUENCY_MHZ: f64 = 850.125;

/// Channel spacing in MHz
pub const CHANNEL_SPACING_MHZ: f64 = 1.0;

// ----------------------------------------------------------------------------
// Timing defaults (milliseconds)
// ----------------------------------------------------------------------------

/// Settle time before and after driving M0/M1
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 40;

/// How long to wait for AUX to go low after a mode change
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 1000;

/// AUX sampling interval
pub const DEFAULT_READY_POLL_INTERVAL_MS: u64 = 100;

/// Frame timeout for register responses
pub const DEFAULT_FRAME_TIMEOUT_MS: u64 = 1000;

/// Power-up delay before the first readiness check
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 1000;

/// Receive-side poll interval while waiting for frame bytes
pub const FRAME_POLL_INTERVAL_MS: u64 = 5;

/// Longest line buffered before a partial line is discarded
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;
