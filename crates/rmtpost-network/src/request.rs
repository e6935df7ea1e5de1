//! Request framing.
//!
//! Only enough HTTP is understood to know when a request has fully
//! arrived: the end of the header block and an optional `Content-Length`.
//! Everything else is left to the body locator.

use rmtpost_core::constants::POST_METHOD;

/// Index just past the blank line that ends the header block.
///
/// The block ends at the second newline with nothing but `\r` between the
/// two, so `\r\n\r\n`, `\n\n` and mixed forms such as `\n\r\n` all
/// match. This is the same rule the body locator applies.
pub fn header_end(buf: &[u8]) -> Option<usize> {
    let mut newlines = 0;
    for (i, &byte) in buf.iter().enumerate() {
        match byte {
            b'\n' => {
                newlines += 1;
                if newlines == 2 {
                    return Some(i + 1);
                }
            }
            b'\r' => {}
            _ => newlines = 0,
        }
    }
    None
}

/// Value of the `Content-Length` header, if present and well-formed.
pub fn content_length(headers: &[u8]) -> Option<usize> {
    headers
        .split(|&b| b == b'\n')
        .filter_map(|line| {
            let colon = line.iter().position(|&b| b == b':')?;
            let (name, value) = line.split_at(colon);
            if !name.trim_ascii().eq_ignore_ascii_case(b"content-length") {
                return None;
            }
            std::str::from_utf8(&value[1..]).ok()?.trim().parse().ok()
        })
        .next()
}

/// Whether the buffered bytes form a complete request.
///
/// A request with a `Content-Length` is complete once that many body bytes
/// follow the headers. A request that is not a POST is complete at the end
/// of its headers. A POST without a length runs until the peer closes.
pub fn is_complete(buf: &[u8]) -> bool {
    let Some(end) = header_end(buf) else {
        return false;
    };

    match content_length(&buf[..end]) {
        Some(len) => buf.len() - end >= len,
        None => !buf.starts_with(POST_METHOD),
    }
}
