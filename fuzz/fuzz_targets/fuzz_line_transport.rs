#![no_main]

use e220_rs::mock::{MockClock, MockSerialPort};
use e220_rs::LineTransport;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let port = MockSerialPort::new();
    let mut transport = LineTransport::new(port.clone(), MockClock::new()).with_max_line_len(64);

    // Feed the input in uneven chunks to exercise partial lines
    for chunk in data.chunks(7) {
        port.queue_rx_data(chunk);
        while let Ok(Some(line)) = transport.read_line() {
            assert!(!line.contains('\n'));
        }
        assert!(transport.buffered_len() <= 64 + 7);
    }
    let _ = transport.drain();
});
