//! # E220 Module Configuration
//!
//! The structured view of the module's eight configuration registers. A
//! [`Configuration`] is always fully populated and never mutated in place:
//! use [`Configuration::to_builder`] to derive a changed copy.
//!
//! ```rust
//! use e220_rs::config::{Configuration, TransmitPower};
//!
//! let cfg = Configuration::default()
//!     .to_builder()
//!     .channel(18)
//!     .transmit_power(TransmitPower::Dbm30)
//!     .build();
//! assert_eq!(cfg.channel(), 18);
//! assert!((cfg.frequency_mhz() - 868.125).abs() < 1e-9);
//! ```

pub mod codec;
pub mod file;

use crate::constants::{BASE_FREQUENCY_MHZ, CHANNEL_SPACING_MHZ};
use crate::error::E220Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use codec::{decode, encode, encode_fields, RegisterBlock, RegisterFields};

/// Declares a register field enum backed by a fixed set of bit indices.
///
/// Variants must be listed in index order starting at zero.
macro_rules! register_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $index:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant = $index, )+
        }

        impl $name {
            /// Every variant, ordered by register index.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Field name used in error reports.
            pub const FIELD: &'static str = $field;

            /// Raw register index of this variant.
            pub fn index(self) -> u8 {
                self as u8
            }

            /// Variant for a raw register index.
            pub fn from_index(index: u8) -> Result<Self, E220Error> {
                match index {
                    $( $index => Ok($name::$variant), )+
                    _ => Err(E220Error::InvalidEnumValue { field: $field, value: index }),
                }
            }

            /// Variant for bits already masked to the field width.
            pub(crate) fn from_bits(bits: u8) -> Self {
                Self::ALL[usize::from(bits) % Self::ALL.len()]
            }

            /// Human label, also used as the serialized form.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

register_enum! {
    /// UART baud rate (REG2 bits 7..5)
    BaudRate, "baud_rate" {
        Baud1200 = 0 => "1200",
        Baud2400 = 1 => "2400",
        Baud4800 = 2 => "4800",
        Baud9600 = 3 => "9600",
        Baud19200 = 4 => "19200",
        Baud38400 = 5 => "38400",
        Baud57600 = 6 => "57600",
        Baud115200 = 7 => "115200",
    }
}

register_enum! {
    /// UART parity and stop bits (REG2 bits 4..3)
    Parity, "parity" {
        EightN1 = 0 => "8N1",
        EightO1 = 1 => "8O1",
        EightE1 = 2 => "8E1",
        EightN2 = 3 => "8N2",
    }
}

register_enum! {
    /// Over-the-air data rate (REG2 bits 2..0)
    ///
    /// The module treats indices 0, 1 and 2 all as 2.4 kbps. They stay distinct
    /// here so a decoded block re-encodes to the same bits.
    AirDataRate, "air_data_rate" {
        Kbps2_4 = 0 => "2.4k",
        Kbps2_4Alt1 = 1 => "2.4k-alt1",
        Kbps2_4Alt2 = 2 => "2.4k-alt2",
        Kbps4_8 = 3 => "4.8k",
        Kbps9_6 = 4 => "9.6k",
        Kbps19_2 = 5 => "19.2k",
        Kbps38_4 = 6 => "38.4k",
        Kbps62_5 = 7 => "62.5k",
    }
}

register_enum! {
    /// Maximum sub-packet length (REG3 bits 7..6)
    SubPacketSize, "sub_packet_size" {
        Bytes200 = 0 => "200 bytes",
        Bytes128 = 1 => "128 bytes",
        Bytes64 = 2 => "64 bytes",
        Bytes32 = 3 => "32 bytes",
    }
}

register_enum! {
    /// Transmit power (REG3 bits 1..0)
    TransmitPower, "transmit_power" {
        Dbm30 = 0 => "30dBm",
        Dbm27 = 1 => "27dBm",
        Dbm24 = 2 => "24dBm",
        Dbm21 = 3 => "21dBm",
    }
}

register_enum! {
    /// Over-the-air addressing (REG5 bit 6)
    TransmissionMethod, "transmission_method" {
        Transparent = 0 => "transparent",
        Fixed = 1 => "fixed",
    }
}

register_enum! {
    /// Wake-on-radio cycle (REG5 bits 2..0)
    WorCycle, "wor_cycle" {
        Ms500 = 0 => "500ms",
        Ms1000 = 1 => "1000ms",
        Ms1500 = 2 => "1500ms",
        Ms2000 = 3 => "2000ms",
        Ms2500 = 4 => "2500ms",
        Ms3000 = 5 => "3000ms",
        Ms3500 = 6 => "3500ms",
        Ms4000 = 7 => "4000ms",
    }
}

impl BaudRate {
    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::Baud1200 => 1200,
            BaudRate::Baud2400 => 2400,
            BaudRate::Baud4800 => 4800,
            BaudRate::Baud9600 => 9600,
            BaudRate::Baud19200 => 19200,
            BaudRate::Baud38400 => 38400,
            BaudRate::Baud57600 => 57600,
            BaudRate::Baud115200 => 115200,
        }
    }
}

impl AirDataRate {
    pub fn bits_per_second(self) -> u32 {
        match self {
            AirDataRate::Kbps2_4 | AirDataRate::Kbps2_4Alt1 | AirDataRate::Kbps2_4Alt2 => 2400,
            AirDataRate::Kbps4_8 => 4800,
            AirDataRate::Kbps9_6 => 9600,
            AirDataRate::Kbps19_2 => 19200,
            AirDataRate::Kbps38_4 => 38400,
            AirDataRate::Kbps62_5 => 62500,
        }
    }
}

impl SubPacketSize {
    pub fn bytes(self) -> usize {
        match self {
            SubPacketSize::Bytes200 => 200,
            SubPacketSize::Bytes128 => 128,
            SubPacketSize::Bytes64 => 64,
            SubPacketSize::Bytes32 => 32,
        }
    }
}

impl TransmitPower {
    pub fn dbm(self) -> i8 {
        match self {
            TransmitPower::Dbm30 => 30,
            TransmitPower::Dbm27 => 27,
            TransmitPower::Dbm24 => 24,
            TransmitPower::Dbm21 => 21,
        }
    }
}

impl WorCycle {
    pub fn millis(self) -> u32 {
        (u32::from(self.index()) + 1) * 500
    }
}

/// Write-only 16-bit encryption key (REG6/REG7).
///
/// The module never reports the key back, so a read-back yields zero. The
/// value is wiped when dropped and hidden from `Debug` output.
#[derive(Clone, PartialEq, Eq, Default, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptKey(u16);

impl CryptKey {
    pub fn new(key: u16) -> Self {
        CryptKey(key)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Debug for CryptKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CryptKey(**)")
    }
}

/// Complete module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    address: u16,
    baud_rate: BaudRate,
    parity: Parity,
    air_data_rate: AirDataRate,
    sub_packet_size: SubPacketSize,
    rssi_ambient_noise: bool,
    transmit_power: TransmitPower,
    channel: u8,
    rssi_byte_enable: bool,
    transmission_method: TransmissionMethod,
    lbt_enable: bool,
    wor_cycle: WorCycle,
    #[serde(default)]
    encryption_key: CryptKey,
}

impl Default for Configuration {
    /// Factory-style settings: 9600 8N1, 2.4k air rate, channel 23, 21 dBm.
    fn default() -> Self {
        Self {
            address: 0x0000,
            baud_rate: BaudRate::Baud9600,
            parity: Parity::EightN1,
            air_data_rate: AirDataRate::Kbps2_4,
            sub_packet_size: SubPacketSize::Bytes200,
            rssi_ambient_noise: false,
            transmit_power: TransmitPower::Dbm21,
            channel: 23,
            rssi_byte_enable: false,
            transmission_method: TransmissionMethod::Transparent,
            lbt_enable: false,
            wor_cycle: WorCycle::Ms500,
            encryption_key: CryptKey::default(),
        }
    }
}

impl Configuration {
    /// Builder starting from the default configuration.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder {
            cfg: Configuration::default(),
        }
    }

    /// Builder starting from a copy of this configuration.
    pub fn to_builder(&self) -> ConfigurationBuilder {
        ConfigurationBuilder { cfg: self.clone() }
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn baud_rate(&self) -> BaudRate {
        self.baud_rate
    }

    pub fn parity(&self) -> Parity {
        self.parity
    }

    pub fn air_data_rate(&self) -> AirDataRate {
        self.air_data_rate
    }

    pub fn sub_packet_size(&self) -> SubPacketSize {
        self.sub_packet_size
    }

    pub fn rssi_ambient_noise(&self) -> bool {
        self.rssi_ambient_noise
    }

    pub fn transmit_power(&self) -> TransmitPower {
        self.transmit_power
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn rssi_byte_enable(&self) -> bool {
        self.rssi_byte_enable
    }

    pub fn transmission_method(&self) -> TransmissionMethod {
        self.transmission_method
    }

    pub fn lbt_enable(&self) -> bool {
        self.lbt_enable
    }

    pub fn wor_cycle(&self) -> WorCycle {
        self.wor_cycle
    }

    pub fn encryption_key(&self) -> &CryptKey {
        &self.encryption_key
    }

    /// Carrier frequency for the configured channel.
    pub fn frequency_mhz(&self) -> f64 {
        BASE_FREQUENCY_MHZ + f64::from(self.channel) * CHANNEL_SPACING_MHZ
    }

    /// Raw register indices for this configuration.
    pub fn to_fields(&self) -> RegisterFields {
        RegisterFields {
            address: self.address,
            baud_rate: self.baud_rate.index(),
            parity: self.parity.index(),
            air_data_rate: self.air_data_rate.index(),
            sub_packet_size: self.sub_packet_size.index(),
            rssi_ambient_noise: self.rssi_ambient_noise,
            transmit_power: self.transmit_power.index(),
            channel: self.channel,
            rssi_byte_enable: self.rssi_byte_enable,
            transmission_method: self.transmission_method.index(),
            lbt_enable: self.lbt_enable,
            wor_cycle: self.wor_cycle.index(),
            encryption_key: self.encryption_key.value(),
        }
    }

    /// Compare every field the module reports back; the key is write-only.
    ///
    /// Returns the name of the first differing field.
    pub fn first_readable_mismatch(&self, other: &Configuration) -> Option<&'static str> {
        if self.address != other.address {
            return Some("address");
        }
        if self.baud_rate != other.baud_rate {
            return Some(BaudRate::FIELD);
        }
        if self.parity != other.parity {
            return Some(Parity::FIELD);
        }
        if self.air_data_rate != other.air_data_rate {
            return Some(AirDataRate::FIELD);
        }
        if self.sub_packet_size != other.sub_packet_size {
            return Some(SubPacketSize::FIELD);
        }
        if self.rssi_ambient_noise != other.rssi_ambient_noise {
            return Some("rssi_ambient_noise");
        }
        if self.transmit_power != other.transmit_power {
            return Some(TransmitPower::FIELD);
        }
        if self.channel != other.channel {
            return Some("channel");
        }
        if self.rssi_byte_enable != other.rssi_byte_enable {
            return Some("rssi_byte_enable");
        }
        if self.transmission_method != other.transmission_method {
            return Some(TransmissionMethod::FIELD);
        }
        if self.lbt_enable != other.lbt_enable {
            return Some("lbt_enable");
        }
        if self.wor_cycle != other.wor_cycle {
            return Some(WorCycle::FIELD);
        }
        None
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# REG 0x00 and 0x01")?;
        writeln!(f, " Address             : 0x{:04x}", self.address)?;
        writeln!(f, "# REG 0x02")?;
        writeln!(f, " Baudrate            : {}", self.baud_rate)?;
        writeln!(f, " Parity              : {}", self.parity)?;
        writeln!(
            f,
            " Air Datarate        : {} ({} bps)",
            self.air_data_rate,
            self.air_data_rate.bits_per_second()
        )?;
        writeln!(f, "# REG 0x03")?;
        writeln!(f, " Sub Packet Setting  : {}", self.sub_packet_size)?;
        writeln!(f, " RSSI Ambient Noise  : {}", enabled(self.rssi_ambient_noise))?;
        writeln!(f, " Transmitting Power  : {}", self.transmit_power)?;
        writeln!(f, "# REG 0x04")?;
        writeln!(
            f,
            " Channel             : {} ({:.3} MHz)",
            self.channel,
            self.frequency_mhz()
        )?;
        writeln!(f, "# REG 0x05")?;
        writeln!(f, " Enable RSSI Byte    : {}", enabled(self.rssi_byte_enable))?;
        writeln!(f, " Transmission Method : {}", self.transmission_method)?;
        writeln!(f, " LBT                 : {}", enabled(self.lbt_enable))?;
        writeln!(f, " WOR Cycle           : {}", self.wor_cycle)?;
        writeln!(f, "# REG 0x06 and 0x07")?;
        write!(f, " Key                 : (write-only)")
    }
}

/// Produces new [`Configuration`] values.
#[derive(Debug, Clone)]
pub struct ConfigurationBuilder {
    cfg: Configuration,
}

impl ConfigurationBuilder {
    pub fn address(mut self, address: u16) -> Self {
        self.cfg.address = address;
        self
    }

    pub fn baud_rate(mut self, baud_rate: BaudRate) -> Self {
        self.cfg.baud_rate = baud_rate;
        self
    }

    pub fn parity(mut self, parity: Parity) -> Self {
        self.cfg.parity = parity;
        self
    }

    pub fn air_data_rate(mut self, rate: AirDataRate) -> Self {
        self.cfg.air_data_rate = rate;
        self
    }

    pub fn sub_packet_size(mut self, size: SubPacketSize) -> Self {
        self.cfg.sub_packet_size = size;
        self
    }

    pub fn rssi_ambient_noise(mut self, enable: bool) -> Self {
        self.cfg.rssi_ambient_noise = enable;
        self
    }

    pub fn transmit_power(mut self, power: TransmitPower) -> Self {
        self.cfg.transmit_power = power;
        self
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.cfg.channel = channel;
        self
    }

    pub fn rssi_byte_enable(mut self, enable: bool) -> Self {
        self.cfg.rssi_byte_enable = enable;
        self
    }

    pub fn transmission_method(mut self, method: TransmissionMethod) -> Self {
        self.cfg.transmission_method = method;
        self
    }

    pub fn lbt_enable(mut self, enable: bool) -> Self {
        self.cfg.lbt_enable = enable;
        self
    }

    pub fn wor_cycle(mut self, cycle: WorCycle) -> Self {
        self.cfg.wor_cycle = cycle;
        self
    }

    pub fn encryption_key(mut self, key: u16) -> Self {
        self.cfg.encryption_key = CryptKey::new(key);
        self
    }

    pub fn build(self) -> Configuration {
        self.cfg
    }
}
