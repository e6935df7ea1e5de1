//! Integration tests for body dispatch against the mock peripheral.

use rmtpost_controller::{Dispatcher, LineOutcome};
use rmtpost_core::{ChannelId, Level};
use rmtpost_hardware::ChannelConfig;
use rmtpost_hardware::mock::{
    self, MockClock, MockHandle, MockScheduler, MockStatusPin, MockTransmitter, PeripheralEvent,
};
use rmtpost_protocol::{ClockRejection, PulseItem, PulseSlot};
use rstest::rstest;
use std::time::Duration;

type MockDispatcher = Dispatcher<MockTransmitter, MockClock, MockStatusPin, MockScheduler>;

fn setup() -> (MockDispatcher, MockHandle) {
    let (peripherals, handle) = mock::peripherals(&ChannelConfig::default()).unwrap();
    (Dispatcher::new(peripherals), handle)
}

#[tokio::test(start_paused = true)]
async fn test_lines_execute_in_order() {
    let (mut dispatcher, handle) = setup();
    // Start from a different divisor so the clock line is a real change
    dispatcher.dispatch_body(b"c,40,5,5\n").await;
    handle.clear_events();

    let report = dispatcher
        .dispatch_body(b"t,100,-50,200\nd,10\nc,80,1,1\n")
        .await;

    let channel = ChannelId::default();
    let expected_items = vec![
        PulseItem::new(
            PulseSlot::new(Level::High, 100),
            PulseSlot::new(Level::Low, 50),
        ),
        PulseItem::new(
            PulseSlot::new(Level::High, 200),
            PulseSlot::new(Level::High, 0),
        ),
    ];

    assert_eq!(
        handle.events(),
        vec![
            PeripheralEvent::PinLevel(Level::High),
            PeripheralEvent::Transmitted {
                channel,
                items: expected_items,
                byte_len: 8,
            },
            PeripheralEvent::PinLevel(Level::Low),
            PeripheralEvent::Delayed(Duration::from_millis(10)),
            PeripheralEvent::DivisorWritten {
                channel,
                divisor: 80,
            },
            PeripheralEvent::CarrierSet {
                channel,
                high: 1,
                low: 1,
            },
            PeripheralEvent::CarrierEnabled {
                channel,
                enabled: true,
            },
        ]
    );

    let outcomes: Vec<_> = report.outcomes().cloned().collect();
    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        outcomes[0],
        LineOutcome::Transmitted {
            records: 3,
            bytes: 8
        }
    );
    assert_eq!(outcomes[1], LineOutcome::Delayed(Duration::from_millis(10)));
    assert!(matches!(
        outcomes[2],
        LineOutcome::ClockApplied {
            divisor_changed: true,
            ..
        }
    ));
}

#[tokio::test]
async fn test_repeated_clock_line_skips_divisor_write() {
    let (mut dispatcher, handle) = setup();

    dispatcher.dispatch_body(b"c,100,7,9\nc,100,7,9\n").await;

    assert_eq!(handle.divisor_writes(), 1);
    assert_eq!(handle.divisor(), 100);
    let carrier_writes = handle
        .events()
        .iter()
        .filter(|event| matches!(event, PeripheralEvent::CarrierSet { .. }))
        .count();
    assert_eq!(carrier_writes, 2);
}

#[rstest]
#[case(&b"c,256,1,1"[..])]
#[case(&b"c,0,1,1"[..])]
#[case(&b"c,80,0,1"[..])]
#[case(&b"c,80,1,65536"[..])]
#[case(&b"c,80,1"[..])]
#[case(&b"c,-80,1,1"[..])]
#[tokio::test]
async fn test_invalid_clock_line_writes_nothing(#[case] body: &[u8]) {
    let (mut dispatcher, handle) = setup();

    let report = dispatcher.dispatch_body(body).await;

    assert!(handle.events().is_empty());
    assert_eq!(handle.divisor(), 80);
    assert!(matches!(
        report.lines()[0].outcome,
        LineOutcome::ClockRejected(_)
    ));
}

#[tokio::test]
async fn test_missing_clock_field_reported() {
    let (mut dispatcher, _handle) = setup();

    let report = dispatcher.dispatch_body(b"c,80,1\n").await;
    assert_eq!(
        report.lines()[0].outcome,
        LineOutcome::ClockRejected(ClockRejection::MissingField { index: 2 })
    );
}

#[tokio::test]
async fn test_dropped_transmit_still_toggles_pin() {
    let (mut dispatcher, handle) = setup();

    let report = dispatcher.dispatch_body(b"t,100,70000,-50,99999\n").await;

    assert!(handle.transmissions().is_empty());
    assert_eq!(
        handle.events(),
        vec![
            PeripheralEvent::PinLevel(Level::High),
            PeripheralEvent::PinLevel(Level::Low),
        ]
    );

    let LineOutcome::TransmitDropped(rejection) = &report.lines()[0].outcome else {
        panic!("expected dropped transmit, got {:?}", report.lines()[0].outcome);
    };
    let indices: Vec<usize> = rejection.faults.iter().map(|fault| fault.index()).collect();
    assert_eq!(indices, vec![1, 3]);
    assert_eq!(rejection.field_count, 4);
}

#[tokio::test(start_paused = true)]
async fn test_sixteen_bit_durations_are_transmitted() {
    let (mut dispatcher, handle) = setup();

    let report = dispatcher.dispatch_body(b"t,40000,-65535\n").await;

    assert!(matches!(
        report.lines()[0].outcome,
        LineOutcome::Transmitted { records: 2, bytes: 4 }
    ));
    assert_eq!(
        handle.transmissions(),
        vec![vec![PulseItem::new(
            PulseSlot::new(Level::High, 40000),
            PulseSlot::new(Level::Low, 65535),
        )]]
    );
}

#[tokio::test(start_paused = true)]
async fn test_event_log_stays_bounded_across_requests() {
    let (mut dispatcher, handle) = setup();

    for _ in 0..1000 {
        dispatcher.dispatch_body(b"t,1,-1,1\n").await;
    }

    let events = handle.events();
    assert_eq!(events.len(), mock::DEFAULT_EVENT_CAPACITY);
    assert_eq!(events.last(), Some(&PeripheralEvent::PinLevel(Level::Low)));
}

#[tokio::test]
async fn test_transmit_failure_is_absorbed() {
    let (mut dispatcher, handle) = setup();
    handle.set_transmit_failure(true);

    let report = dispatcher.dispatch_body(b"t,100,-100\nd,5\n").await;

    assert!(matches!(
        report.lines()[0].outcome,
        LineOutcome::HardwareFault {
            command: "transmit",
            ..
        }
    ));
    assert_eq!(
        report.lines()[1].outcome,
        LineOutcome::Delayed(Duration::from_millis(5))
    );
    assert_eq!(handle.pin_level(), Level::Low);
    assert_eq!(report.summary().hardware_faults, 1);
}

#[tokio::test]
async fn test_register_failure_is_absorbed() {
    let (mut dispatcher, handle) = setup();
    handle.set_register_failure(true);

    let report = dispatcher.dispatch_body(b"c,40,1,1\nt,10\n").await;

    assert!(matches!(
        report.lines()[0].outcome,
        LineOutcome::HardwareFault {
            command: "clock",
            ..
        }
    ));
    assert!(matches!(
        report.lines()[1].outcome,
        LineOutcome::Transmitted { records: 1, .. }
    ));
    assert_eq!(handle.divisor(), 80);
}

#[rstest]
#[case(&b"d,0"[..])]
#[case(&b"d,-10"[..])]
#[case(&b"d,"[..])]
#[tokio::test]
async fn test_non_positive_delay_ignored(#[case] body: &[u8]) {
    let (mut dispatcher, handle) = setup();

    let report = dispatcher.dispatch_body(body).await;

    assert_eq!(report.lines()[0].outcome, LineOutcome::DelayIgnored);
    assert!(handle.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_delay_waits() {
    let (mut dispatcher, _handle) = setup();

    let start = tokio::time::Instant::now();
    dispatcher.dispatch_body(b"d,250").await;
    assert!(start.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_unknown_tags_and_blank_lines_ignored() {
    let (mut dispatcher, handle) = setup();

    let report = dispatcher
        .dispatch_body(b"\r\n\r\nx,1,2\r\n\r\nt\r\nhello\r\n\r\n")
        .await;

    assert_eq!(report.len(), 3);
    assert!(report.outcomes().all(|o| *o == LineOutcome::Unknown));
    assert_eq!(report.summary().ignored, 3);
    assert!(handle.events().is_empty());
}

#[tokio::test]
async fn test_line_ranges_are_body_relative() {
    let (mut dispatcher, _handle) = setup();

    let report = dispatcher.dispatch_body(b"d,1\r\n\r\nx,2").await;

    let ranges: Vec<(usize, usize)> = report
        .lines()
        .iter()
        .map(|line| (line.range.start(), line.range.end()))
        .collect();
    assert_eq!(ranges, vec![(0, 3), (7, 10)]);
}
