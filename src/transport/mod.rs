//! # UART Line Transport
//!
//! The E220 shares one UART between two protocols: newline-terminated
//! application text in normal mode, and fixed-length binary register frames in
//! program mode. [`LineTransport`] layers both on top of a raw, non-blocking
//! [`SerialIo`] byte port and keeps one receive buffer for them.
//!
//! Blocking happens only in [`LineTransport::read_exact`], which polls the port
//! until the frame is complete or the frame timeout expires.

pub mod serial;

use crate::constants::{
    DEFAULT_FRAME_TIMEOUT_MS, DEFAULT_MAX_LINE_LEN, FRAME_POLL_INTERVAL_MS, LINE_TERMINATOR,
};
use crate::error::E220Error;
use crate::hal::Clock;
use std::time::Duration;

pub use serial::{SerialPortIo, SerialSettings};

/// Upper bound on reads performed by a single drain.
const MAX_DRAIN_READS: usize = 64;

/// Raw byte port underneath the line transport.
pub trait SerialIo {
    /// Write every byte of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<(), E220Error>;

    /// Copy bytes that have already arrived into `buf` without blocking.
    ///
    /// Returns 0 when nothing is waiting.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, E220Error>;
}

impl<T: SerialIo + ?Sized> SerialIo for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), E220Error> {
        (**self).write_all(data)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, E220Error> {
        (**self).read_available(buf)
    }
}

/// Byte and line framing over a [`SerialIo`] port.
pub struct LineTransport<S: SerialIo, C: Clock> {
    io: S,
    clock: C,
    rx: Vec<u8>,
    frame_timeout: Duration,
    max_line_len: usize,
    /// Set while skipping the rest of an overlong line
    discarding: bool,
}

impl<S: SerialIo, C: Clock> LineTransport<S, C> {
    pub fn new(io: S, clock: C) -> Self {
        Self {
            io,
            clock,
            rx: Vec::new(),
            frame_timeout: Duration::from_millis(DEFAULT_FRAME_TIMEOUT_MS),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            discarding: false,
        }
    }

    /// Set how long [`read_exact`](Self::read_exact) waits for a full frame
    pub fn with_frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    /// Set the longest partial line kept while waiting for its terminator
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len.max(1);
        self
    }

    pub fn frame_timeout(&self) -> Duration {
        self.frame_timeout
    }

    /// Bytes received but not yet consumed
    pub fn buffered_len(&self) -> usize {
        self.rx.len()
    }

    /// Pull whatever the port has into the receive buffer.
    fn fill(&mut self) -> Result<usize, E220Error> {
        let mut chunk = [0u8; 256];
        let mut total = 0;
        loop {
            let n = self.io.read_available(&mut chunk)?;
            if n == 0 {
                break;
            }
            self.rx.extend_from_slice(&chunk[..n]);
            total += n;
            if n < chunk.len() {
                break;
            }
        }
        Ok(total)
    }

    /// Write raw bytes to the UART.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), E220Error> {
        log::trace!("UART tx {} bytes: {}", bytes.len(), hex::encode(bytes));
        self.io.write_all(bytes)
    }

    /// Non-blocking check for a complete, newline-terminated line.
    ///
    /// If the buffer reaches the line length limit without a terminator, the
    /// partial line is discarded, and so is the rest of it up to and
    /// including the next terminator.
    pub fn has_pending_line(&mut self) -> Result<bool, E220Error> {
        self.fill()?;
        if self.discarding {
            match self.rx.iter().position(|&b| b == LINE_TERMINATOR) {
                Some(end) => {
                    log::debug!("Skipped {} trailing bytes of an overlong line", end + 1);
                    self.rx.drain(..=end);
                    self.discarding = false;
                }
                None => {
                    self.rx.clear();
                    return Ok(false);
                }
            }
        }
        if self.rx.contains(&LINE_TERMINATOR) {
            return Ok(true);
        }
        if self.rx.len() >= self.max_line_len {
            log::warn!(
                "Discarding {} bytes received without a line terminator",
                self.rx.len()
            );
            self.rx.clear();
            self.discarding = true;
        }
        Ok(false)
    }

    /// Next buffered line with its terminator stripped, or `None`.
    pub fn read_line(&mut self) -> Result<Option<String>, E220Error> {
        if !self.has_pending_line()? {
            return Ok(None);
        }
        let Some(end) = self.rx.iter().position(|&b| b == LINE_TERMINATOR) else {
            return Ok(None);
        };
        let mut line: Vec<u8> = self.rx.drain(..=end).collect();
        line.pop();
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Write `text` followed by one newline.
    ///
    /// Text containing a newline cannot be carried by the line protocol and
    /// is rejected before anything is sent.
    pub fn write_line(&mut self, text: &str) -> Result<(), E220Error> {
        if text.as_bytes().contains(&LINE_TERMINATOR) {
            return Err(E220Error::InvalidPayload(
                "line payload must not contain a newline".into(),
            ));
        }
        let mut frame = Vec::with_capacity(text.len() + 1);
        frame.extend_from_slice(text.as_bytes());
        frame.push(LINE_TERMINATOR);
        self.write_bytes(&frame)
    }

    /// Block until exactly `n` bytes have arrived or the frame timeout expires.
    ///
    /// A partial frame is removed from the buffer and returned inside
    /// `ShortRead`; if nothing at all arrived the error is `TransportTimeout`.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>, E220Error> {
        let start = self.clock.now();
        let poll = Duration::from_millis(FRAME_POLL_INTERVAL_MS);

        loop {
            self.fill()?;
            if self.rx.len() >= n {
                let frame: Vec<u8> = self.rx.drain(..n).collect();
                log::trace!("UART rx frame: {}", hex::encode(&frame));
                return Ok(frame);
            }

            let elapsed = self.clock.elapsed_since(start);
            if elapsed >= self.frame_timeout {
                break;
            }
            self.clock.sleep(poll.min(self.frame_timeout - elapsed));
        }

        let waited_ms = self.clock.elapsed_since(start).as_millis() as u64;
        if self.rx.is_empty() {
            log::debug!("No response after {waited_ms}ms (expected {n} bytes)");
            return Err(E220Error::TransportTimeout {
                expected: n,
                waited_ms,
            });
        }

        let received = std::mem::take(&mut self.rx);
        log::debug!(
            "Short frame after {waited_ms}ms: {}",
            hex::encode(&received)
        );
        Err(E220Error::ShortRead {
            expected: n,
            received,
        })
    }

    /// Discard everything received so far without blocking.
    ///
    /// Returns the number of bytes thrown away.
    pub fn drain(&mut self) -> Result<usize, E220Error> {
        let mut stale = std::mem::take(&mut self.rx);
        self.discarding = false;
        let mut chunk = [0u8; 256];
        for _ in 0..MAX_DRAIN_READS {
            let n = self.io.read_available(&mut chunk)?;
            if n == 0 {
                break;
            }
            stale.extend_from_slice(&chunk[..n]);
        }

        if !stale.is_empty() {
            log::debug!("Drained {} stale bytes: {}", stale.len(), hex::encode(&stale));
        }
        Ok(stale.len())
    }
}
