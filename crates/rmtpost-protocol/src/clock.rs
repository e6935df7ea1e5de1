//! Clock line validation.
//!
//! A clock line carries three fields, all of which must be present and in
//! range before anything is written to the peripheral:
//!
//! | Field | Meaning | Range |
//! |-------|---------|-------|
//! | 0 | channel clock divisor (8-bit) | `1..=255` |
//! | 1 | carrier high time (16-bit) | `1..=65535` |
//! | 2 | carrier low time (16-bit) | `1..=65535` |

use crate::field::read_field;
use rmtpost_core::{ClockConfig, Error};
use thiserror::Error;

/// Why a clock line was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockRejection {
    #[error("clock field {index} not found")]
    MissingField { index: usize },

    #[error("clock {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("invalid clock line: {message}")]
    Invalid { message: String },
}

/// Validate a clock line's value portion.
///
/// All three fields are read before any check is applied, and the line is
/// accepted only as a whole.
///
/// # Examples
///
/// ```
/// use rmtpost_protocol::{ClockRejection, parse_clock};
///
/// let config = parse_clock(b"80,1,1").unwrap();
/// assert_eq!(config.divisor(), 80);
///
/// assert!(matches!(parse_clock(b"256,1,1"), Err(ClockRejection::OutOfRange { .. })));
/// assert!(matches!(parse_clock(b"80,1"), Err(ClockRejection::MissingField { index: 2 })));
/// ```
pub fn parse_clock(value: &[u8]) -> Result<ClockConfig, ClockRejection> {
    let fields = [0, 1, 2].map(|index| read_field(value, index));

    let [Some(divisor), Some(high), Some(low)] = fields else {
        let index = fields.iter().position(Option::is_none).unwrap_or(0);
        return Err(ClockRejection::MissingField { index });
    };

    ClockConfig::new(divisor, high, low).map_err(|err| match err {
        Error::OutOfRange { field, value, .. } => ClockRejection::OutOfRange { field, value },
        other => ClockRejection::Invalid {
            message: other.to_string(),
        },
    })
}
