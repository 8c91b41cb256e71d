//! # Raspberry Pi HAL Implementation
//!
//! GPIO and UART access for an E220 module wired to a Raspberry Pi 4 or 5,
//! using the rppal crate.
//!
//! ## Hardware Setup
//!
//! ```text
//! Pi Pin │ BCM GPIO │ E220 Pin │ Function
//! ───────┼──────────┼──────────┼──────────────────────
//! 8      │ GPIO 14  │ RXD      │ UART TX
//! 10     │ GPIO 15  │ TXD      │ UART RX
//! 16     │ GPIO 23  │ M0       │ Mode select (output)
//! 18     │ GPIO 24  │ M1       │ Mode select (output)
//! 22     │ GPIO 25  │ AUX      │ Busy/ready (input)
//! ```
//!
//! Enable the primary UART (`enable_uart=1`) and disable the serial console.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use e220_rs::hal::raspberry_pi::RaspberryPiHalBuilder;
//! use e220_rs::driver::{DriverConfig, E220Driver};
//! use e220_rs::hal::SystemClock;
//!
//! let (pins, uart) = RaspberryPiHalBuilder::new().m0_pin(23).m1_pin(24).aux_pin(25).build()?;
//! let mut driver = E220Driver::new(pins, uart, SystemClock::new(), DriverConfig::default())?;
//! println!("{}", driver.read_configuration()?);
//! # Ok::<(), e220_rs::E220Error>(())
//! ```

use super::{Level, ModePins};
use crate::error::E220Error;
use crate::transport::SerialIo;
use rppal::gpio::{Gpio, InputPin, Level as PinLevel, OutputPin};
use rppal::uart::{Parity, Queue, Uart};
use std::path::PathBuf;
use std::time::Duration;

/// BCM GPIO numbers of the control lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePinConfig {
    /// M0 (output)
    pub m0: u8,
    /// M1 (output)
    pub m1: u8,
    /// AUX (input)
    pub aux: u8,
}

impl Default for ModePinConfig {
    fn default() -> Self {
        Self {
            m0: 23,  // GPIO 23 (Pin 16)
            m1: 24,  // GPIO 24 (Pin 18)
            aux: 25, // GPIO 25 (Pin 22)
        }
    }
}

fn to_pin_level(level: Level) -> PinLevel {
    match level {
        Level::Low => PinLevel::Low,
        Level::High => PinLevel::High,
    }
}

/// M0/M1 outputs and AUX input on the Pi header
pub struct RaspberryPiPins {
    m0: OutputPin,
    m1: OutputPin,
    aux: InputPin,
}

impl RaspberryPiPins {
    /// Claim the three pins. M0/M1 start low (Normal mode).
    pub fn new(pins: &ModePinConfig) -> Result<Self, E220Error> {
        let gpio = Gpio::new().map_err(|e| E220Error::Gpio(e.to_string()))?;
        let claim = |pin: u8| {
            gpio.get(pin)
                .map_err(|e| E220Error::Gpio(format!("GPIO {pin}: {e}")))
        };

        let m0 = claim(pins.m0)?.into_output_low();
        let m1 = claim(pins.m1)?.into_output_low();
        let aux = claim(pins.aux)?.into_input();

        log::info!("Raspberry Pi GPIO initialized:");
        log::info!("  M0: GPIO {}", pins.m0);
        log::info!("  M1: GPIO {}", pins.m1);
        log::info!("  AUX: GPIO {}", pins.aux);

        Ok(Self { m0, m1, aux })
    }
}

impl ModePins for RaspberryPiPins {
    fn set_mode_select(&mut self, m0: Level, m1: Level) {
        self.m0.write(to_pin_level(m0));
        self.m1.write(to_pin_level(m1));
    }

    fn ready_line_is_low(&mut self) -> bool {
        self.aux.is_low()
    }
}

/// Pi UART as a non-blocking [`SerialIo`] port
pub struct RaspberryPiUart {
    uart: Uart,
}

impl RaspberryPiUart {
    /// Open `path` 8N1 with reads that return immediately.
    pub fn new(path: impl Into<PathBuf>, baudrate: u32) -> Result<Self, E220Error> {
        let path = path.into();
        let mut uart = Uart::with_path(&path, baudrate, Parity::None, 8, 1)
            .map_err(|e| E220Error::SerialPortError(format!("{}: {e}", path.display())))?;
        uart.set_read_mode(0, Duration::ZERO)
            .map_err(|e| E220Error::SerialPortError(e.to_string()))?;
        uart.flush(Queue::Both)
            .map_err(|e| E220Error::SerialPortError(e.to_string()))?;

        log::info!("UART {} opened at {} baud", path.display(), baudrate);
        Ok(Self { uart })
    }
}

impl SerialIo for RaspberryPiUart {
    fn write_all(&mut self, data: &[u8]) -> Result<(), E220Error> {
        let mut sent = 0;
        while sent < data.len() {
            let n = self
                .uart
                .write(&data[sent..])
                .map_err(|e| E220Error::SerialPortError(e.to_string()))?;
            if n == 0 {
                return Err(E220Error::SerialPortError("UART write returned 0".into()));
            }
            sent += n;
        }
        self.uart
            .drain()
            .map_err(|e| E220Error::SerialPortError(e.to_string()))
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, E220Error> {
        let waiting = self
            .uart
            .input_len()
            .map_err(|e| E220Error::SerialPortError(e.to_string()))?;
        if waiting == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = waiting.min(buf.len());
        self.uart
            .read(&mut buf[..want])
            .map_err(|e| E220Error::SerialPortError(e.to_string()))
    }
}

/// Builder for the Pi pins and UART
///
/// # Examples
///
/// ```rust,no_run
/// use e220_rs::hal::raspberry_pi::RaspberryPiHalBuilder;
///
/// let (pins, uart) = RaspberryPiHalBuilder::new()
///     .uart_path("/dev/ttyAMA0")
///     .baudrate(9600)
///     .m0_pin(17)
///     .m1_pin(27)
///     .aux_pin(22)
///     .build()?;
/// # Ok::<(), e220_rs::E220Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RaspberryPiHalBuilder {
    uart_path: PathBuf,
    baudrate: u32,
    pins: ModePinConfig,
}

impl Default for RaspberryPiHalBuilder {
    fn default() -> Self {
        Self {
            uart_path: PathBuf::from("/dev/serial0"),
            baudrate: 9600,
            pins: ModePinConfig::default(),
        }
    }
}

impl RaspberryPiHalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uart_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.uart_path = path.into();
        self
    }

    pub fn baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    pub fn m0_pin(mut self, pin: u8) -> Self {
        self.pins.m0 = pin;
        self
    }

    pub fn m1_pin(mut self, pin: u8) -> Self {
        self.pins.m1 = pin;
        self
    }

    pub fn aux_pin(mut self, pin: u8) -> Self {
        self.pins.aux = pin;
        self
    }

    pub fn pins(&self) -> &ModePinConfig {
        &self.pins
    }

    /// Reject pin assignments that reuse a GPIO or fall outside the header.
    pub fn validate(&self) -> Result<(), E220Error> {
        let ModePinConfig { m0, m1, aux } = self.pins;
        if m0 == m1 || m0 == aux || m1 == aux {
            return Err(E220Error::Gpio(format!(
                "M0/M1/AUX must be distinct (got {m0}/{m1}/{aux})"
            )));
        }
        if let Some(pin) = [m0, m1, aux].into_iter().find(|&p| p > 27) {
            return Err(E220Error::Gpio(format!("GPIO {pin} is not on the 40-pin header")));
        }
        if self.baudrate == 0 {
            return Err(E220Error::SerialPortError("baudrate must be non-zero".into()));
        }
        Ok(())
    }

    /// Claim the pins and open the UART
    pub fn build(self) -> Result<(RaspberryPiPins, RaspberryPiUart), E220Error> {
        self.validate()?;
        let pins = RaspberryPiPins::new(&self.pins)?;
        let uart = RaspberryPiUart::new(self.uart_path, self.baudrate)?;
        Ok((pins, uart))
    }
}
