//! Mock hardware for testing
//!
//! Fake serial port, control lines and clock that let the driver run without
//! a module attached. Every mock is a cheap clone over shared state, so a test
//! keeps one handle for inspection and gives another to the driver.

use crate::error::E220Error;
use crate::hal::{Clock, Level, ModePins};
use crate::transport::SerialIo;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock serial port that simulates bidirectional communication
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Data written to the port (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Individual write calls, in order
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Data to be read from the port (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Replies released into the rx buffer one per write
    replies: Arc<Mutex<VecDeque<Vec<u8>>>>,
    /// Simulated error for the next operation
    next_error: Arc<Mutex<Option<String>>>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue data to be read from the port right away
    pub fn queue_rx_data(&self, data: &[u8]) {
        lock(&self.rx_buffer).extend(data);
    }

    /// Queue a reply that arrives after the next write, the way the module
    /// answers a command. Replies are released in order, one per write.
    pub fn queue_reply(&self, data: &[u8]) {
        lock(&self.replies).push_back(data.to_vec());
    }

    /// Get all data that was written to the port
    pub fn get_tx_data(&self) -> Vec<u8> {
        lock(&self.tx_buffer).clone()
    }

    /// Each write call as a separate frame
    pub fn writes(&self) -> Vec<Vec<u8>> {
        lock(&self.writes).clone()
    }

    /// Bytes waiting to be read
    pub fn rx_len(&self) -> usize {
        lock(&self.rx_buffer).len()
    }

    /// Replies not yet released
    pub fn pending_replies(&self) -> usize {
        lock(&self.replies).len()
    }

    /// Clear all buffers
    pub fn clear(&self) {
        lock(&self.tx_buffer).clear();
        lock(&self.writes).clear();
        lock(&self.rx_buffer).clear();
        lock(&self.replies).clear();
    }

    /// Set an error to be returned on the next operation
    pub fn set_next_error(&self, message: &str) {
        *lock(&self.next_error) = Some(message.to_string());
    }

    fn take_error(&self) -> Result<(), E220Error> {
        match lock(&self.next_error).take() {
            Some(message) => Err(E220Error::SerialPortError(message)),
            None => Ok(()),
        }
    }
}

impl SerialIo for MockSerialPort {
    fn write_all(&mut self, data: &[u8]) -> Result<(), E220Error> {
        self.take_error()?;
        lock(&self.tx_buffer).extend_from_slice(data);
        lock(&self.writes).push(data.to_vec());
        if let Some(reply) = lock(&self.replies).pop_front() {
            lock(&self.rx_buffer).extend(reply);
        }
        Ok(())
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, E220Error> {
        self.take_error()?;
        let mut rx = lock(&self.rx_buffer);
        let n = rx.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

/// How the mock AUX line behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyScript {
    /// Always low
    Ready,
    /// High for this many samples after power-up and after each mode change
    BusyFor(usize),
    /// Never goes low
    StuckHigh,
}

#[derive(Debug)]
struct PinState {
    levels: (Level, Level),
    history: Vec<(Level, Level)>,
    changed_at: Vec<Duration>,
    script: ReadyScript,
    busy_remaining: usize,
    polls: usize,
}

/// Mock M0/M1/AUX lines
#[derive(Clone)]
pub struct MockPins {
    state: Arc<Mutex<PinState>>,
    clock: Option<MockClock>,
}

impl MockPins {
    pub fn new(script: ReadyScript) -> Self {
        let busy_remaining = match script {
            ReadyScript::BusyFor(n) => n,
            _ => 0,
        };
        Self {
            state: Arc::new(Mutex::new(PinState {
                levels: (Level::Low, Level::Low),
                history: Vec::new(),
                changed_at: Vec::new(),
                script,
                busy_remaining,
                polls: 0,
            })),
            clock: None,
        }
    }

    /// Timestamp level changes with `clock`
    pub fn with_clock(mut self, clock: MockClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Current (M0, M1) levels
    pub fn levels(&self) -> (Level, Level) {
        lock(&self.state).levels
    }

    /// Every (M0, M1) pair driven by the driver, in order
    pub fn history(&self) -> Vec<(Level, Level)> {
        lock(&self.state).history.clone()
    }

    /// Clock time of each level change (needs [`with_clock`](Self::with_clock))
    pub fn level_changes_at(&self) -> Vec<Duration> {
        lock(&self.state).changed_at.clone()
    }

    /// Number of AUX samples taken
    pub fn ready_polls(&self) -> usize {
        lock(&self.state).polls
    }

    /// Change the AUX behaviour from now on
    pub fn set_script(&self, script: ReadyScript) {
        let mut state = lock(&self.state);
        state.script = script;
        state.busy_remaining = match script {
            ReadyScript::BusyFor(n) => n,
            _ => 0,
        };
    }

    /// Set the lines as if something other than the driver had, e.g. the
    /// power-up default. Not recorded in the history.
    pub fn set_mode_select_external(&self, m0: Level, m1: Level) {
        lock(&self.state).levels = (m0, m1);
    }
}

impl ModePins for MockPins {
    fn set_mode_select(&mut self, m0: Level, m1: Level) {
        let now = self.clock.as_ref().map(|c| c.now());
        let mut state = lock(&self.state);
        state.levels = (m0, m1);
        state.history.push((m0, m1));
        if let Some(now) = now {
            state.changed_at.push(now);
        }
        if let ReadyScript::BusyFor(n) = state.script {
            state.busy_remaining = n;
        }
    }

    fn ready_line_is_low(&mut self) -> bool {
        let mut state = lock(&self.state);
        state.polls += 1;
        match state.script {
            ReadyScript::Ready => true,
            ReadyScript::StuckHigh => false,
            ReadyScript::BusyFor(_) => {
                if state.busy_remaining > 0 {
                    state.busy_remaining -= 1;
                    false
                } else {
                    true
                }
            }
        }
    }
}

/// Virtual clock; `sleep` advances time instantly
#[derive(Clone, Default)]
pub struct MockClock {
    now: Arc<Mutex<Duration>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sleep requested, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        lock(&self.sleeps).clone()
    }

    /// Total virtual time slept
    pub fn total_slept(&self) -> Duration {
        lock(&self.sleeps).iter().sum()
    }

    /// Move time forward without recording a sleep
    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        *lock(&self.now)
    }

    fn sleep(&self, duration: Duration) {
        lock(&self.sleeps).push(duration);
        *lock(&self.now) += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_released_on_write() {
        let mut port = MockSerialPort::new();
        port.queue_reply(&[0xAA, 0xBB]);
        assert_eq!(port.rx_len(), 0);

        port.write_all(&[0x01]).unwrap();
        assert_eq!(port.rx_len(), 2);
        assert_eq!(port.pending_replies(), 0);

        let mut buf = [0u8; 8];
        assert_eq!(port.read_available(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[0xAA, 0xBB]);
        assert_eq!(port.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_injected_error() {
        let mut port = MockSerialPort::new();
        port.set_next_error("unplugged");
        assert!(port.write_all(b"x").is_err());
        assert!(port.write_all(b"x").is_ok());
        assert_eq!(port.writes(), vec![b"x".to_vec()]);
    }

    #[test]
    fn test_busy_script_resets_on_mode_change() {
        let mut pins = MockPins::new(ReadyScript::BusyFor(1));
        assert!(!pins.ready_line_is_low());
        assert!(pins.ready_line_is_low());

        pins.set_mode_select(Level::High, Level::High);
        assert!(!pins.ready_line_is_low());
        assert!(pins.ready_line_is_low());
        assert_eq!(pins.ready_polls(), 4);
        assert_eq!(pins.history(), vec![(Level::High, Level::High)]);
    }

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::new();
        clock.sleep(Duration::from_millis(40));
        clock.advance(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(45));
        assert_eq!(clock.total_slept(), Duration::from_millis(40));
    }
}
