use criterion::{black_box, criterion_group, criterion_main, Criterion};
use e220_rs::config::{decode, encode, AirDataRate, Configuration, RegisterBlock, TransmitPower};

fn benchmark_encode(c: &mut Criterion) {
    let cfg = Configuration::default()
        .to_builder()
        .address(0x1234)
        .channel(18)
        .air_data_rate(AirDataRate::Kbps9_6)
        .transmit_power(TransmitPower::Dbm30)
        .encryption_key(0xBEEF)
        .build();

    c.bench_function("encode_configuration", |b| {
        b.iter(|| {
            let block = encode(black_box(&cfg));
            let _ = black_box(block);
        })
    });
}

fn benchmark_decode(c: &mut Criterion) {
    let block = RegisterBlock::new([0x12, 0x34, 0x64, 0x20, 0x12, 0x83, 0xBE, 0xEF]);

    c.bench_function("decode_registers", |b| {
        b.iter(|| {
            let cfg = decode(black_box(&block));
            let _ = black_box(cfg);
        })
    });
}

fn benchmark_register_dump(c: &mut Criterion) {
    let block = RegisterBlock::new([0x00, 0x00, 0x60, 0x03, 0x17, 0x00, 0x00, 0x00]);

    c.bench_function("register_dump", |b| {
        b.iter(|| {
            let dump = black_box(&block).register_dump();
            let _ = black_box(dump);
        })
    });
}

criterion_group!(
    benches,
    benchmark_encode,
    benchmark_decode,
    benchmark_register_dump
);
criterion_main!(benches);
