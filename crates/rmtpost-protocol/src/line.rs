//! Splitting a body into command lines.
//!
//! A line ends at `\r`, `\n`, or the end of the body. Runs of terminators
//! are skipped as a whole, so `\r\n`, bare `\r`, bare `\n`, and blank lines
//! all separate lines the same way, and empty lines are never yielded.

use crate::command::Command;
use rmtpost_core::ByteRange;

fn is_terminator(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}

/// One non-empty line of a body, terminators excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    range: ByteRange,
    bytes: &'a [u8],
}

impl<'a> Line<'a> {
    /// Position of the line relative to the start of the body.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Leading tag byte.
    pub fn tag(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Classify the line by its tag. See [`Command::classify`].
    pub fn command(&self) -> Command<'a> {
        Command::classify(self.bytes)
    }
}

/// Iterator over the non-empty lines of a body.
///
/// # Examples
///
/// ```
/// use rmtpost_protocol::Lines;
///
/// let lines: Vec<_> = Lines::new(b"c,80,1,1\r\n\r\nt,100\rd,5")
///     .map(|line| line.as_bytes())
///     .collect();
/// assert_eq!(lines, vec![&b"c,80,1,1"[..], &b"t,100"[..], &b"d,5"[..]]);
/// ```
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    body: &'a [u8],
    cursor: usize,
}

impl<'a> Lines<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self { body, cursor: 0 }
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.body.len();

        // Skip any run of terminators left by the previous line
        while self.cursor < len && is_terminator(self.body[self.cursor]) {
            self.cursor += 1;
        }
        if self.cursor >= len {
            return None;
        }

        let start = self.cursor;
        while self.cursor < len && !is_terminator(self.body[self.cursor]) {
            self.cursor += 1;
        }

        let range = ByteRange::new(start, self.cursor, len).ok()?;
        Some(Line {
            range,
            bytes: &self.body[start..self.cursor],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn collect(body: &[u8]) -> Vec<&[u8]> {
        Lines::new(body).map(|line| line.as_bytes()).collect()
    }

    #[rstest]
    #[case(b"t,1\nd,2\n")]
    #[case(b"t,1\r\nd,2\r\n")]
    #[case(b"t,1\rd,2\r")]
    #[case(b"t,1\n\n\r\n\rd,2")]
    #[case(b"\r\n\r\nt,1\nd,2")]
    fn test_terminator_styles(#[case] body: &[u8]) {
        assert_eq!(collect(body), vec![&b"t,1"[..], &b"d,2"[..]]);
    }

    #[rstest]
    #[case(b"")]
    #[case(b"\n")]
    #[case(b"\r\n\r\n\n")]
    fn test_no_lines(#[case] body: &[u8]) {
        assert!(collect(body).is_empty());
    }

    #[test]
    fn test_line_ranges_are_body_relative() {
        let ranges: Vec<_> = Lines::new(b"c,1\r\n\r\nt,22\n")
            .map(|line| (line.range().start(), line.range().end()))
            .collect();
        assert_eq!(ranges, vec![(0, 3), (7, 11)]);
    }

    #[test]
    fn test_last_line_without_terminator() {
        let lines: Vec<_> = Lines::new(b"d,10\nt,5").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].as_bytes(), b"t,5");
        assert_eq!(lines[1].tag(), Some(b't'));
    }
}
