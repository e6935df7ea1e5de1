//! Locating the command payload inside a raw HTTP request.
//!
//! The body starts after the first blank line following the request line.
//! A blank line is two consecutive `\n` bytes; `\r` bytes are transparent,
//! so `\r\n\r\n`, `\n\n`, and `\n\r\n` all qualify, and longer runs of
//! newlines are accepted.

use crate::line::Lines;
use rmtpost_core::{
    ByteRange,
    constants::{BODY_SCAN_OFFSET, MIN_REQUEST_LEN, POST_METHOD},
};

/// Whether `request` looks like a POST: longer than five bytes and starting
/// with the literal method name.
pub fn is_post(request: &[u8]) -> bool {
    request.len() > MIN_REQUEST_LEN && request.starts_with(POST_METHOD)
}

/// Index of the first body byte, or `None` if no blank line is followed by
/// content.
///
/// Scanning starts at [`BODY_SCAN_OFFSET`], past `"POST "`. A single
/// newline followed by content resets the newline count; two or more
/// newlines followed by a non-newline byte mark the body start. Buffers
/// shorter than the offset are not scanned.
///
/// # Examples
///
/// ```
/// use rmtpost_protocol::locate_body;
///
/// assert_eq!(locate_body(b"POST a\r\n\r\nb"), Some(10));
/// assert_eq!(locate_body(b"POST a\n\nb"), Some(8));
/// assert_eq!(locate_body(b"POST a\r\nb"), None);
/// ```
pub fn locate_body(request: &[u8]) -> Option<usize> {
    let mut newlines = 0u32;

    for (index, &byte) in request.iter().enumerate().skip(BODY_SCAN_OFFSET) {
        match byte {
            b'\r' => continue,
            b'\n' => newlines += 1,
            _ if newlines > 1 => return Some(index),
            _ => newlines = 0,
        }
    }

    None
}

/// The command payload of one request.
///
/// Borrows the request buffer for the duration of a single dispatch; the
/// range always lies within that buffer.
#[derive(Debug, Clone, Copy)]
pub struct RequestBody<'a> {
    request: &'a [u8],
    range: ByteRange,
}

impl<'a> RequestBody<'a> {
    /// Locate the body of `request`. See [`locate_body`].
    pub fn locate(request: &'a [u8]) -> Option<Self> {
        let start = locate_body(request)?;
        let range = ByteRange::new(start, request.len(), request.len()).ok()?;
        Some(Self { request, range })
    }

    /// Body position within the request buffer.
    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        &self.request[self.range.start()..self.range.end()]
    }

    /// Iterate over the body's non-empty lines.
    pub fn lines(&self) -> Lines<'a> {
        Lines::new(self.as_bytes())
    }
}
