//! Mode transition handshake against mock lines and a virtual clock.

use e220_rs::hal::Level;
use e220_rs::mock::{MockClock, MockPins, MockSerialPort, ReadyScript};
use e220_rs::mode::ModeTiming;
use e220_rs::{Clock, E220Error, LineTransport, Mode, ModeController, Readiness};
use std::time::Duration;

struct Rig {
    controller: ModeController<MockPins, MockClock>,
    transport: LineTransport<MockSerialPort, MockClock>,
    pins: MockPins,
    port: MockSerialPort,
    clock: MockClock,
}

fn rig(script: ReadyScript, timing: ModeTiming) -> Rig {
    let clock = MockClock::new();
    let pins = MockPins::new(script).with_clock(clock.clone());
    let port = MockSerialPort::new();
    Rig {
        controller: ModeController::new(pins.clone(), clock.clone(), timing),
        transport: LineTransport::new(port.clone(), clock.clone()),
        pins,
        port,
        clock,
    }
}

#[test]
fn test_every_mode_reaches_its_levels() {
    let mut r = rig(ReadyScript::Ready, ModeTiming::default());

    for mode in [Mode::WakeUp, Mode::PowerDown, Mode::Program, Mode::Normal] {
        let readiness = r.controller.set_mode(mode, &mut r.transport).unwrap();
        assert!(readiness.is_ready());
        assert_eq!(r.controller.current_mode(), mode);
        assert_eq!(r.pins.levels(), mode.levels());
        assert_eq!(Mode::from_levels(mode.levels().0, mode.levels().1), mode);
    }

    assert_eq!(
        r.pins.history(),
        vec![
            (Level::High, Level::Low),
            (Level::Low, Level::High),
            (Level::High, Level::High),
            (Level::Low, Level::Low),
        ]
    );
}

#[test]
fn test_lines_change_between_settle_delays() {
    let mut r = rig(ReadyScript::Ready, ModeTiming::default());
    r.controller.set_mode(Mode::Program, &mut r.transport).unwrap();
    r.controller.set_mode(Mode::Normal, &mut r.transport).unwrap();

    assert_eq!(
        r.pins.level_changes_at(),
        vec![Duration::from_millis(40), Duration::from_millis(120)]
    );
    assert_eq!(r.clock.now(), Duration::from_millis(160));
}

#[test]
fn test_banner_drained_during_transition() {
    let mut r = rig(ReadyScript::Ready, ModeTiming::default());
    r.port.queue_rx_data(b"E220 boot\r\n");

    r.controller.set_mode(Mode::Program, &mut r.transport).unwrap();
    assert_eq!(r.port.rx_len(), 0);
    assert_eq!(r.transport.buffered_len(), 0);
}

#[test]
fn test_short_ready_timeout() {
    let timing = ModeTiming {
        settle_delay: Duration::from_millis(10),
        ready_timeout: Duration::from_millis(300),
        poll_interval: Duration::from_millis(100),
    };
    let mut r = rig(ReadyScript::StuckHigh, timing);

    let readiness = r.controller.set_mode(Mode::WakeUp, &mut r.transport).unwrap();
    assert_eq!(
        readiness,
        Readiness::NotReady {
            waited: Duration::from_millis(300)
        }
    );
    assert_eq!(r.pins.ready_polls(), 4);
    // Lines are switched even though AUX never settled
    assert_eq!(r.controller.current_mode(), Mode::WakeUp);

    match readiness.into_result() {
        Err(E220Error::ModuleNotReady { waited_ms }) => assert_eq!(waited_ms, 300),
        other => panic!("expected ModuleNotReady, got {other:?}"),
    }
}

#[test]
fn test_recovers_after_aux_settles() {
    let mut r = rig(ReadyScript::StuckHigh, ModeTiming::default());
    let first = r.controller.set_mode(Mode::Program, &mut r.transport).unwrap();
    assert!(!first.is_ready());

    r.pins.set_script(ReadyScript::BusyFor(2));
    let second = r.controller.set_mode(Mode::Normal, &mut r.transport).unwrap();
    assert_eq!(
        second,
        Readiness::Ready {
            waited: Duration::from_millis(200)
        }
    );
}

#[test]
fn test_initialize_overrides_power_up_levels() {
    let mut r = rig(ReadyScript::Ready, ModeTiming::default());
    r.pins.set_mode_select_external(Level::High, Level::High);
    r.port.queue_rx_data(b"\x00\x00garbage");

    let readiness = r
        .controller
        .initialize(&mut r.transport, Duration::from_millis(1000))
        .unwrap();

    assert!(readiness.is_ready());
    assert_eq!(r.pins.levels(), (Level::Low, Level::Low));
    assert_eq!(r.controller.current_mode(), Mode::Normal);
    assert_eq!(r.port.rx_len(), 0);
    assert_eq!(r.clock.sleeps(), vec![Duration::from_millis(1000)]);
}

#[test]
fn test_drain_error_propagates() {
    let mut r = rig(ReadyScript::Ready, ModeTiming::default());
    r.port.set_next_error("framing error");

    let err = r.controller.set_mode(Mode::Program, &mut r.transport).unwrap_err();
    assert!(matches!(err, E220Error::SerialPortError(_)));
    assert_eq!(r.pins.levels(), Mode::Program.levels());
}
