//! Register codec tests against known register images.

use e220_rs::config::{
    decode, encode, encode_fields, AirDataRate, BaudRate, Configuration, Parity, RegisterBlock,
    RegisterFields, SubPacketSize, TransmissionMethod, TransmitPower, WorCycle,
};
use e220_rs::E220Error;
use proptest::prelude::*;

fn block_from_hex(hex: &str) -> RegisterBlock {
    let bytes = hex::decode(hex).unwrap();
    RegisterBlock::try_from(bytes.as_slice()).unwrap()
}

const DEFAULT_REGISTERS_HEX: &str = "0000600317000000";

/// Address 0x1234, 9600 8N1 at 9.6k, 200 bytes, 30dBm, channel 18,
/// RSSI byte and LBT on, fixed mode, 2000ms WOR, key 0xBEEF.
const CUSTOM_REGISTERS_HEX: &str = "1234640012d3beef";

#[test]
fn test_default_configuration_registers() {
    let block = encode(&Configuration::default()).unwrap();
    assert_eq!(block.as_bytes(), &[0x00, 0x00, 0x60, 0x03, 0x17, 0x00, 0x00, 0x00]);
    assert_eq!(block.to_string(), DEFAULT_REGISTERS_HEX);
}

#[test]
fn test_decode_default_registers() {
    let cfg = decode(&block_from_hex(DEFAULT_REGISTERS_HEX));
    assert_eq!(cfg, Configuration::default());
    assert_eq!(cfg.baud_rate(), BaudRate::Baud9600);
    assert_eq!(cfg.parity(), Parity::EightN1);
    assert_eq!(cfg.air_data_rate(), AirDataRate::Kbps2_4);
    assert_eq!(cfg.transmit_power(), TransmitPower::Dbm21);
    assert_eq!(cfg.channel(), 0x17);
}

#[test]
fn test_custom_registers() {
    let cfg = Configuration::builder()
        .address(0x1234)
        .baud_rate(BaudRate::Baud9600)
        .parity(Parity::EightN1)
        .air_data_rate(AirDataRate::Kbps9_6)
        .sub_packet_size(SubPacketSize::Bytes200)
        .rssi_ambient_noise(false)
        .transmit_power(TransmitPower::Dbm30)
        .channel(18)
        .rssi_byte_enable(true)
        .transmission_method(TransmissionMethod::Fixed)
        .lbt_enable(true)
        .wor_cycle(WorCycle::Ms2000)
        .encryption_key(0xBEEF)
        .build();

    let block = encode(&cfg).unwrap();
    assert_eq!(block.to_string(), CUSTOM_REGISTERS_HEX);
    assert_eq!(decode(&block), cfg);
}

#[test]
fn test_reserved_bits_ignored_on_decode() {
    // Same as the default image with every reserved bit set
    let noisy = block_from_hex("0000601f17280000");
    let cfg = decode(&noisy);
    assert_eq!(cfg, Configuration::default());
    assert_eq!(encode(&cfg).unwrap().to_string(), DEFAULT_REGISTERS_HEX);
}

#[test]
fn test_alternate_air_rate_indices_preserved() {
    for (index, rate) in [
        (0u8, AirDataRate::Kbps2_4),
        (1, AirDataRate::Kbps2_4Alt1),
        (2, AirDataRate::Kbps2_4Alt2),
    ] {
        let block = RegisterBlock::new([0, 0, 0x60 | index, 0x03, 0x17, 0, 0, 0]);
        let cfg = decode(&block);
        assert_eq!(cfg.air_data_rate(), rate);
        assert_eq!(cfg.air_data_rate().bits_per_second(), 2400);
        assert_eq!(encode(&cfg).unwrap(), block);
    }
}

#[test]
fn test_out_of_range_fields_rejected() {
    let cases: [(&str, fn(&mut RegisterFields)); 7] = [
        ("baud_rate", |f| f.baud_rate = 8),
        ("parity", |f| f.parity = 4),
        ("air_data_rate", |f| f.air_data_rate = 8),
        ("sub_packet_size", |f| f.sub_packet_size = 4),
        ("transmit_power", |f| f.transmit_power = 4),
        ("transmission_method", |f| f.transmission_method = 2),
        ("wor_cycle", |f| f.wor_cycle = 8),
    ];

    for (name, corrupt) in cases {
        let mut fields = Configuration::default().to_fields();
        corrupt(&mut fields);
        match encode_fields(&fields) {
            Err(E220Error::InvalidEnumValue { field, .. }) => assert_eq!(field, name),
            other => panic!("{name}: expected InvalidEnumValue, got {other:?}"),
        }
    }
}

#[test]
fn test_wrong_length_block_rejected() {
    let bytes = [0u8; 7];
    assert!(matches!(
        RegisterBlock::try_from(&bytes[..]),
        Err(E220Error::ShortRead { expected: 8, ref received }) if received.len() == 7
    ));
}

fn arb_fields() -> impl Strategy<Value = RegisterFields> {
    (
        (any::<u16>(), 0u8..8, 0u8..4, 0u8..8, 0u8..4, any::<bool>(), 0u8..4),
        (any::<u8>(), any::<bool>(), 0u8..2, any::<bool>(), 0u8..8, any::<u16>()),
    )
        .prop_map(
            |(
                (address, baud_rate, parity, air_data_rate, sub_packet_size, rssi_ambient_noise, transmit_power),
                (channel, rssi_byte_enable, transmission_method, lbt_enable, wor_cycle, encryption_key),
            )| RegisterFields {
                address,
                baud_rate,
                parity,
                air_data_rate,
                sub_packet_size,
                rssi_ambient_noise,
                transmit_power,
                channel,
                rssi_byte_enable,
                transmission_method,
                lbt_enable,
                wor_cycle,
                encryption_key,
            },
        )
}

proptest! {
    #[test]
    fn prop_valid_fields_survive_encode_decode(fields in arb_fields()) {
        let block = encode_fields(&fields).unwrap();
        let cfg = decode(&block);
        prop_assert_eq!(cfg.to_fields(), fields);
        prop_assert_eq!(encode(&cfg).unwrap(), block);
    }

    #[test]
    fn prop_any_register_image_decodes(bytes in any::<[u8; 8]>()) {
        let cfg = decode(&RegisterBlock::new(bytes));
        let again = encode(&cfg).unwrap();
        // Only reserved bits may differ
        let mask = [0xFF, 0xFF, 0xFF, 0xE3, 0xFF, 0xD7, 0xFF, 0xFF];
        for i in 0..8 {
            prop_assert_eq!(again.as_bytes()[i], bytes[i] & mask[i]);
        }
    }
}
