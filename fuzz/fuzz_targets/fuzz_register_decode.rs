#![no_main]

use e220_rs::config::{decode, encode, RegisterBlock};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(block) = RegisterBlock::try_from(data) else {
        return;
    };
    let cfg = decode(&block);

    // Anything decoded must encode again, identical up to reserved bits
    let again = encode(&cfg).expect("decoded configuration must encode");
    assert_eq!(decode(&again), cfg);
    let _ = cfg.to_string();
    let _ = block.register_dump();
});
