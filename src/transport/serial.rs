//! # Serial Port Backend
//!
//! [`SerialIo`] over an OS serial device (USB-UART adapters, `/dev/serial0`,
//! `COM3`). Uses the blocking port API re-exported by `tokio_serial`; reads
//! only take what `bytes_to_read` reports, so they never block.

use super::SerialIo;
use crate::error::E220Error;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tokio_serial::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Configuration for serial connection.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baudrate: u32,
    pub timeout: Duration,
}

impl Default for SerialSettings {
    /// The module ships at 9600 8N1.
    fn default() -> Self {
        SerialSettings {
            port: "/dev/serial0".to_string(),
            baudrate: 9600,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Serial device handle implementing [`SerialIo`].
pub struct SerialPortIo {
    port: Box<dyn SerialPort>,
}

impl SerialPortIo {
    /// Open the port 8N1 without flow control, as the module expects.
    pub fn open(settings: &SerialSettings) -> Result<Self, E220Error> {
        let port = tokio_serial::new(settings.port.as_str(), settings.baudrate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.timeout)
            .open()
            .map_err(|e| E220Error::SerialPortError(format!("{}: {e}", settings.port)))?;

        // Anything queued before we opened belongs to nobody.
        port.clear(ClearBuffer::All)
            .map_err(|e| E220Error::SerialPortError(e.to_string()))?;

        log::info!(
            "Opened serial port {} at {} baud",
            settings.port,
            settings.baudrate
        );
        Ok(Self { port })
    }

    /// Wrap an already opened port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl SerialIo for SerialPortIo {
    fn write_all(&mut self, data: &[u8]) -> Result<(), E220Error> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, E220Error> {
        let waiting = self
            .port
            .bytes_to_read()
            .map_err(|e| E220Error::SerialPortError(e.to_string()))? as usize;
        if waiting == 0 || buf.is_empty() {
            return Ok(0);
        }

        let want = waiting.min(buf.len());
        match self.port.read(&mut buf[..want]) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
