//! Property-based tests for field scanning, body location, and pulse packing.
//!
//! These tests use proptest to generate random inputs and verify that the
//! decoding invariants hold for every combination.

use proptest::prelude::*;
use rmtpost_core::{Level, constants::MAX_PULSE_DURATION};
use rmtpost_protocol::{
    Command, RequestBody, count_fields, encode_pulses, locate_body, read_field,
};

/// Strategy for valid pulse values, either sign.
fn pulse_value() -> impl Strategy<Value = i64> {
    let max = i64::from(MAX_PULSE_DURATION);
    -max..=max
}

/// Strategy for header-ish text that never contains a newline.
fn single_line_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 0..200)
}

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

proptest! {
    /// Property: a field's decimal text reads back as the same value.
    #[test]
    fn prop_read_field_roundtrip(values in prop::collection::vec(any::<i32>(), 1..20)) {
        let values: Vec<i64> = values.into_iter().map(i64::from).collect();
        let line = join(&values);

        for (index, expected) in values.iter().enumerate() {
            prop_assert_eq!(read_field(line.as_bytes(), index), Some(*expected));
        }
        prop_assert_eq!(read_field(line.as_bytes(), values.len()), None);
    }

    /// Property: N separators always make N + 1 fields.
    #[test]
    fn prop_count_fields_is_commas_plus_one(text in "[0-9,\\-]{0,64}") {
        let commas = text.bytes().filter(|b| *b == b',').count();
        prop_assert_eq!(count_fields(text.as_bytes()), commas + 1);
    }

    /// Property: an index beyond the separator count is never found.
    #[test]
    fn prop_missing_index_not_found(text in "[0-9,]{0,64}", extra in 1usize..10) {
        let commas = text.bytes().filter(|b| *b == b',').count();
        prop_assert_eq!(read_field(text.as_bytes(), commas + extra), None);
        prop_assert!(read_field(text.as_bytes(), commas).is_some());
    }

    /// Property: without a newline after the method, no body is found.
    #[test]
    fn prop_no_blank_line_no_body(rest in single_line_text()) {
        let mut request = b"POST ".to_vec();
        request.extend_from_slice(&rest);
        prop_assert_eq!(locate_body(&request), None);
    }

    /// Property: CRLF and LF header terminators locate the same body.
    #[test]
    fn prop_crlf_and_lf_agree(
        path in "/[a-z]{0,12}",
        body in "[a-z0-9,]{1,40}",
    ) {
        let crlf = format!("POST {path} HTTP/1.1\r\nHost: esp\r\n\r\n{body}");
        let lf = format!("POST {path} HTTP/1.1\nHost: esp\n\n{body}");

        let crlf_body = RequestBody::locate(crlf.as_bytes()).map(|b| b.as_bytes().to_vec());
        let lf_body = RequestBody::locate(lf.as_bytes()).map(|b| b.as_bytes().to_vec());
        prop_assert_eq!(crlf_body.as_deref(), Some(body.as_bytes()));
        prop_assert_eq!(lf_body.as_deref(), Some(body.as_bytes()));
    }

    /// Property: n values pack into ceil(n/2) items, in order, with the
    /// sign selecting the level.
    #[test]
    fn prop_pulse_pairing(values in prop::collection::vec(pulse_value(), 1..64)) {
        let line = join(&values);
        let buffer = encode_pulses(line.as_bytes()).unwrap();

        prop_assert_eq!(buffer.record_count(), values.len());
        prop_assert_eq!(buffer.items().len(), values.len().div_ceil(2));
        prop_assert_eq!(buffer.byte_len(), 4 * values.len().div_ceil(2));

        for (index, value) in values.iter().enumerate() {
            let slot = buffer.record(index).unwrap();
            prop_assert_eq!(slot.level, Level::from_sign(*value));
            prop_assert_eq!(i64::from(slot.duration), value.abs());
        }

        // Odd trains end with a zero-length slot at the last record's level
        if values.len() % 2 == 1 {
            let last = buffer.items()[buffer.items().len() - 1];
            prop_assert_eq!(last.second().duration, 0);
            prop_assert_eq!(last.second().level, last.first().level);
        }
    }

    /// Property: one oversized value anywhere drops the whole line.
    #[test]
    fn prop_one_bad_value_rejects_line(
        mut values in prop::collection::vec(pulse_value(), 1..32),
        position in any::<prop::sample::Index>(),
        excess in 1i64..1_000_000,
    ) {
        let index = position.index(values.len());
        values[index] = i64::from(MAX_PULSE_DURATION) + excess;

        let rejection = encode_pulses(join(&values).as_bytes()).unwrap_err();
        prop_assert_eq!(rejection.faults.len(), 1);
        prop_assert_eq!(rejection.faults[0].index(), index);
    }

    /// Property: classification never panics and only `c,`, `t,`, `d,`
    /// prefixes are actionable.
    #[test]
    fn prop_classify_total(line in prop::collection::vec(any::<u8>(), 0..16)) {
        let command = Command::classify(&line);
        let actionable = line.len() > 1
            && line[1] == b','
            && matches!(line[0], b'c' | b't' | b'd');
        prop_assert_eq!(!matches!(command, Command::Unknown(_)), actionable);
    }
}
