//! # Register Block Codec
//!
//! Bit-exact conversion between [`Configuration`] and the eight configuration
//! registers (REG0..REG7) exchanged with the module.
//!
//! ```text
//! REG0..1  ADDH ADDL                      address, big-endian
//! REG2     BBB PP AAA                     baud | parity | air data rate
//! REG3     SS N xxx TT                    sub-packet | RSSI noise | power
//! REG4     CCCCCCCC                       channel
//! REG5     R M x L x WWW                  RSSI byte | method | LBT | WOR
//! REG6..7  KEYH KEYL                      crypt key, big-endian
//! ```
//!
//! Reserved bits (`x`) are written as zero and ignored on decode.

use super::{
    AirDataRate, BaudRate, Configuration, Parity, SubPacketSize, TransmissionMethod,
    TransmitPower, WorCycle,
};
use crate::constants::REGISTER_BLOCK_LEN;
use crate::error::E220Error;
use std::fmt;

/// The raw eight-byte register image.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterBlock([u8; REGISTER_BLOCK_LEN]);

impl RegisterBlock {
    pub fn new(bytes: [u8; REGISTER_BLOCK_LEN]) -> Self {
        RegisterBlock(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_BLOCK_LEN] {
        &self.0
    }

    /// One line per register: `REG 02H = 60 [01100000]`.
    pub fn register_dump(&self) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(reg, b)| format!("REG {reg:02X}H = {b:02x} [{b:08b}]"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TryFrom<&[u8]> for RegisterBlock {
    type Error = E220Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let block: [u8; REGISTER_BLOCK_LEN] =
            bytes.try_into().map_err(|_| E220Error::ShortRead {
                expected: REGISTER_BLOCK_LEN,
                received: bytes.to_vec(),
            })?;
        Ok(RegisterBlock(block))
    }
}

impl fmt::Debug for RegisterBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterBlock({})", hex::encode_upper(self.0))
    }
}

impl fmt::Display for RegisterBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Unvalidated register field indices.
///
/// This is the form enum fields take on the wire; [`encode_fields`] checks
/// every index against its field's cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFields {
    pub address: u16,
    pub baud_rate: u8,
    pub parity: u8,
    pub air_data_rate: u8,
    pub sub_packet_size: u8,
    pub rssi_ambient_noise: bool,
    pub transmit_power: u8,
    pub channel: u8,
    pub rssi_byte_enable: bool,
    pub transmission_method: u8,
    pub lbt_enable: bool,
    pub wor_cycle: u8,
    pub encryption_key: u16,
}

/// Encode a configuration into its register image.
pub fn encode(cfg: &Configuration) -> Result<RegisterBlock, E220Error> {
    encode_fields(&cfg.to_fields())
}

/// Encode raw field indices, rejecting any index outside its enum.
pub fn encode_fields(fields: &RegisterFields) -> Result<RegisterBlock, E220Error> {
    let baud = BaudRate::from_index(fields.baud_rate)?.index();
    let parity = Parity::from_index(fields.parity)?.index();
    let air = AirDataRate::from_index(fields.air_data_rate)?.index();
    let sub_packet = SubPacketSize::from_index(fields.sub_packet_size)?.index();
    let power = TransmitPower::from_index(fields.transmit_power)?.index();
    let method = TransmissionMethod::from_index(fields.transmission_method)?.index();
    let wor = WorCycle::from_index(fields.wor_cycle)?.index();

    let [addh, addl] = fields.address.to_be_bytes();
    let [keyh, keyl] = fields.encryption_key.to_be_bytes();

    let reg2 = baud << 5 | parity << 3 | air;
    let reg3 = sub_packet << 6 | u8::from(fields.rssi_ambient_noise) << 5 | power;
    let reg5 = u8::from(fields.rssi_byte_enable) << 7
        | method << 6
        | u8::from(fields.lbt_enable) << 4
        | wor;

    Ok(RegisterBlock([
        addh,
        addl,
        reg2,
        reg3,
        fields.channel,
        reg5,
        keyh,
        keyl,
    ]))
}

/// Decode a register image. Every bit pattern maps to a configuration.
pub fn decode(block: &RegisterBlock) -> Configuration {
    let r = block.0;
    Configuration::builder()
        .address(u16::from_be_bytes([r[0], r[1]]))
        .baud_rate(BaudRate::from_bits((r[2] & 0b1110_0000) >> 5))
        .parity(Parity::from_bits((r[2] & 0b0001_1000) >> 3))
        .air_data_rate(AirDataRate::from_bits(r[2] & 0b0000_0111))
        .sub_packet_size(SubPacketSize::from_bits((r[3] & 0b1100_0000) >> 6))
        .rssi_ambient_noise(r[3] & 0b0010_0000 != 0)
        .transmit_power(TransmitPower::from_bits(r[3] & 0b0000_0011))
        .channel(r[4])
        .rssi_byte_enable(r[5] & 0b1000_0000 != 0)
        .transmission_method(TransmissionMethod::from_bits((r[5] & 0b0100_0000) >> 6))
        .lbt_enable(r[5] & 0b0001_0000 != 0)
        .wor_cycle(WorCycle::from_bits(r[5] & 0b0000_0111))
        .encryption_key(u16::from_be_bytes([r[6], r[7]]))
        .build()
}
