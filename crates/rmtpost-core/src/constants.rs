//! Core constants for the RMT command protocol.
//!
//! This module defines the protocol-level constants shared by the parser,
//! the peripheral layer, and the HTTP listener: line tags, register widths,
//! channel defaults, and the two fixed HTTP responses.
//!
//! # Protocol Structure
//!
//! A request is an HTTP POST whose body holds one command per line:
//!
//! ```text
//! c,<divisor>,<high>,<low>      carrier clock configuration
//! t,<value>,<value>,...         pulse train (sign = level, magnitude = duration)
//! d,<milliseconds>              delay before the next line
//! ```
//!
//! Lines are separated by `\r`, `\n`, or `\r\n`. Blank lines and unknown
//! tags are ignored.
//!
//! # Usage
//!
//! ```
//! use rmtpost_core::constants::*;
//!
//! assert_eq!(TAG_TRANSMIT, b't');
//! assert!(MIN_CLOCK_DIVISOR <= DEFAULT_CLOCK_DIVISOR);
//! assert_eq!(SOURCE_CLOCK_HZ / DEFAULT_CLOCK_DIVISOR as u32, 1_000_000);
//! ```

// ============================================================================
// Request Framing
// ============================================================================

/// Method marker every accepted request must begin with.
pub const POST_METHOD: &[u8] = b"POST";

/// Offset at which the body search starts (`"POST "` is skipped).
pub const BODY_SCAN_OFFSET: usize = 5;

/// A request must be strictly longer than this to be considered a POST.
pub const MIN_REQUEST_LEN: usize = 5;

// ============================================================================
// Line Tags
// ============================================================================

/// Tag of a carrier clock configuration line (`c,div,high,low`).
pub const TAG_CLOCK: u8 = b'c';

/// Tag of a pulse train line (`t,v0,v1,...`).
pub const TAG_TRANSMIT: u8 = b't';

/// Tag of a delay line (`d,ms`).
pub const TAG_DELAY: u8 = b'd';

/// Separator between a tag and its values, and between values.
pub const FIELD_SEPARATOR: u8 = b',';

/// Sign marker for a negative (low level) value.
pub const NEGATIVE_SIGN: u8 = b'-';

// ============================================================================
// Register Widths
// ============================================================================

/// Smallest accepted clock divisor (8-bit register, zero is invalid).
pub const MIN_CLOCK_DIVISOR: u8 = 1;

/// Largest accepted clock divisor.
pub const MAX_CLOCK_DIVISOR: u8 = u8::MAX;

/// Smallest accepted carrier high/low time (16-bit register, zero is invalid).
pub const MIN_CARRIER_TICKS: u16 = 1;

/// Largest accepted carrier high/low time.
pub const MAX_CARRIER_TICKS: u16 = u16::MAX;

/// Largest duration a pulse record accepts (unsigned 16-bit).
pub const MAX_PULSE_DURATION: u16 = u16::MAX;

/// Duration bits the peripheral stores per item slot. Wider durations are
/// truncated to these bits when packed.
pub const PULSE_DURATION_FIELD_MASK: u16 = 0x7FFF;

/// Number of transmit channels on the peripheral.
pub const MAX_CHANNELS: u8 = 8;

// ============================================================================
// Channel Defaults
// ============================================================================

/// Source clock feeding the channel divider.
pub const SOURCE_CLOCK_HZ: u32 = 80_000_000;

/// Default channel used for transmission.
pub const DEFAULT_CHANNEL: u8 = 0;

/// Default clock divisor: 80 MHz / 80 gives a 1 µs tick.
pub const DEFAULT_CLOCK_DIVISOR: u8 = 80;

/// Default carrier frequency (typical for IR remotes).
pub const DEFAULT_CARRIER_FREQ_HZ: u32 = 40_000;

/// Default carrier duty cycle in percent.
pub const DEFAULT_CARRIER_DUTY_PERCENT: u8 = 50;

// ============================================================================
// HTTP Surface
// ============================================================================

/// Default HTTP listening port.
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Response sent for every POST, whatever the decode outcome.
pub const HTTP_ACCEPTED: &[u8] = b"HTTP/1.1 202 Accepted\r\nConnection: close\r\n\r\n";

/// Response sent for every non-POST request.
pub const HTTP_METHOD_NOT_ALLOWED: &[u8] =
    b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n";
