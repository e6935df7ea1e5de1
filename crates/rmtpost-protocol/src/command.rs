//! Line classification by tag.
//!
//! ```text
//! clock-line    = "c" "," divisor "," high "," low
//! transmit-line = "t" "," value { "," value }
//! delay-line    = "d" "," milliseconds
//! ```

use crate::field::read_field;
use rmtpost_core::constants::{FIELD_SEPARATOR, TAG_CLOCK, TAG_DELAY, TAG_TRANSMIT};
use std::time::Duration;

/// A classified line. Each variant borrows the value portion that follows
/// the `tag,` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `c,<divisor>,<high>,<low>`
    Clock(&'a [u8]),

    /// `t,<value>,...`
    Transmit(&'a [u8]),

    /// `d,<milliseconds>`
    Delay(&'a [u8]),

    /// Too short to carry a tag, or a tag nobody handles. Ignored.
    Unknown(&'a [u8]),
}

impl<'a> Command<'a> {
    /// Classify a line (terminators already removed).
    ///
    /// A line is actionable only if it is longer than one byte and its
    /// second byte is the field separator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rmtpost_protocol::Command;
    ///
    /// assert_eq!(Command::classify(b"d,10"), Command::Delay(b"10"));
    /// assert_eq!(Command::classify(b"t,"), Command::Transmit(b""));
    /// assert_eq!(Command::classify(b"x,1"), Command::Unknown(b"x,1"));
    /// assert_eq!(Command::classify(b"t"), Command::Unknown(b"t"));
    /// ```
    pub fn classify(line: &'a [u8]) -> Self {
        match line {
            [tag, sep, value @ ..] if *sep == FIELD_SEPARATOR => match *tag {
                TAG_CLOCK => Command::Clock(value),
                TAG_TRANSMIT => Command::Transmit(value),
                TAG_DELAY => Command::Delay(value),
                _ => Command::Unknown(line),
            },
            _ => Command::Unknown(line),
        }
    }

    /// Short name used in logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Clock(_) => "clock",
            Command::Transmit(_) => "transmit",
            Command::Delay(_) => "delay",
            Command::Unknown(_) => "unknown",
        }
    }
}

/// Delay requested by a delay line's value portion.
///
/// Only a present, strictly positive field 0 yields a delay; anything else
/// is ignored by the caller.
///
/// # Examples
///
/// ```
/// use rmtpost_protocol::parse_delay;
/// use std::time::Duration;
///
/// assert_eq!(parse_delay(b"10"), Some(Duration::from_millis(10)));
/// assert_eq!(parse_delay(b"0"), None);
/// assert_eq!(parse_delay(b"-5"), None);
/// ```
pub fn parse_delay(value: &[u8]) -> Option<Duration> {
    let millis = read_field(value, 0)?;
    let millis = u64::try_from(millis).ok().filter(|&ms| ms > 0)?;
    Some(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"c,80,1,1", "clock")]
    #[case(b"t,100,-50", "transmit")]
    #[case(b"d,10", "delay")]
    #[case(b"c,", "clock")]
    #[case(b"x,1", "unknown")]
    #[case(b"tt,1", "unknown")]
    #[case(b"c", "unknown")]
    #[case(b"C,80,1,1", "unknown")]
    fn test_classify(#[case] line: &[u8], #[case] expected: &str) {
        assert_eq!(Command::classify(line).name(), expected);
    }

    #[test]
    fn test_classify_strips_prefix() {
        assert_eq!(Command::classify(b"t,100,-50"), Command::Transmit(b"100,-50"));
        assert_eq!(Command::classify(b"c,80,1,1"), Command::Clock(b"80,1,1"));
    }

    #[rstest]
    #[case(b"10", Some(10))]
    #[case(b"1", Some(1))]
    #[case(b"250,99", Some(250))] // extra fields ignored
    #[case(b"0", None)]
    #[case(b"-10", None)]
    #[case(b"", None)] // empty reads as zero
    fn test_parse_delay(#[case] value: &[u8], #[case] expected_ms: Option<u64>) {
        assert_eq!(parse_delay(value), expected_ms.map(Duration::from_millis));
    }
}
