//! Comma-separated signed integer fields.
//!
//! A line's value portion is a run of decimal fields separated by `,`:
//!
//! ```text
//! 100,-50,200
//! ^^^ ^^^ ^^^
//!  0   1   2
//! ```
//!
//! Reading a field never fails with an error. A field index past the last
//! comma is reported as absent (`None`), which callers treat as a normal
//! negative result.
//!
//! # Empty Fields
//!
//! A field with no digits reads as `0`. `"5,,7"` has three fields and
//! field 1 is `Some(0)`; a lone `"-"` is also `Some(0)`. Protocol producers
//! rely on this, so it is kept as-is.

use rmtpost_core::constants::{FIELD_SEPARATOR, NEGATIVE_SIGN};

/// Read the `index`-th (0-based) signed decimal field of `value`.
///
/// Returns `None` when `value` has fewer than `index` separators. Parsing
/// of a present field stops at the first byte that is not an ASCII digit,
/// after an optional leading `-`. Digits accumulate with saturation, so
/// oversized numbers stay out of range instead of wrapping.
///
/// # Examples
///
/// ```
/// use rmtpost_protocol::read_field;
///
/// assert_eq!(read_field(b"100,-50,200", 1), Some(-50));
/// assert_eq!(read_field(b"100,-50,200", 3), None);
/// assert_eq!(read_field(b"100,,200", 1), Some(0)); // empty field
/// ```
pub fn read_field(value: &[u8], index: usize) -> Option<i64> {
    let mut cursor = 0;

    // Position just past the index-th separator
    if index > 0 {
        let mut commas = 0;
        loop {
            let byte = *value.get(cursor)?;
            cursor += 1;
            if byte == FIELD_SEPARATOR {
                commas += 1;
                if commas == index {
                    break;
                }
            }
        }
    }

    let negative = value.get(cursor) == Some(&NEGATIVE_SIGN);
    if negative {
        cursor += 1;
    }

    let mut number: i64 = 0;
    while let Some(&byte) = value.get(cursor) {
        if !byte.is_ascii_digit() {
            break;
        }
        number = number
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
        cursor += 1;
    }

    Some(if negative { -number } else { number })
}

/// Number of fields in `value`: separators + 1.
///
/// An empty range still counts as one (empty) field.
pub fn count_fields(value: &[u8]) -> usize {
    value.iter().filter(|&&b| b == FIELD_SEPARATOR).count() + 1
}

/// Borrowing view over a line's value portion.
#[derive(Debug, Clone, Copy)]
pub struct FieldScanner<'a> {
    value: &'a [u8],
}

impl<'a> FieldScanner<'a> {
    pub fn new(value: &'a [u8]) -> Self {
        Self { value }
    }

    /// See [`read_field`].
    pub fn field(&self, index: usize) -> Option<i64> {
        read_field(self.value, index)
    }

    /// See [`count_fields`].
    pub fn count(&self) -> usize {
        count_fields(self.value)
    }

    /// Iterate over every field in order.
    ///
    /// Yields exactly [`count`](Self::count) items.
    pub fn iter(&self) -> impl Iterator<Item = Option<i64>> + '_ {
        (0..self.count()).map(|index| self.field(index))
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.value
    }
}
