use crate::{
    Result,
    constants::{
        MAX_CARRIER_TICKS, MAX_CHANNELS, MAX_CLOCK_DIVISOR, MIN_CARRIER_TICKS, MIN_CLOCK_DIVISOR,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `start..end` into a buffer of known length.
///
/// The invariant `start <= end <= len` is checked at construction, so a
/// `ByteRange` can always be used to slice the buffer it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: usize,
    end: usize,
}

impl ByteRange {
    /// Create a range over a buffer of length `len`.
    ///
    /// # Errors
    /// Returns `Error::InvalidRange` unless `start <= end <= len`.
    pub fn new(start: usize, end: usize, len: usize) -> Result<Self> {
        if start > end || end > len {
            return Err(Error::InvalidRange { start, end, len });
        }
        Ok(ByteRange { start, end })
    }

    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice `buf` by this range, or `None` if `buf` is shorter than the
    /// buffer the range was validated against.
    #[must_use]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.start..self.end)
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Output level of one pulse slot.
///
/// The sign of a transmitted value selects the level: negative values are
/// emitted low, zero and positive values are emitted high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level selected by the sign of a protocol value.
    #[must_use]
    pub fn from_sign(value: i64) -> Self {
        if value < 0 { Level::Low } else { Level::High }
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }

    /// Bit value used in the packed slot layout.
    #[must_use]
    pub fn as_bit(&self) -> u32 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Transmit channel identifier (0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChannelId(u8);

impl ChannelId {
    /// Create a channel ID with validation.
    ///
    /// # Errors
    /// Returns `Error::OutOfRange` if the channel does not exist on the peripheral.
    pub fn new(id: u8) -> Result<Self> {
        if id >= MAX_CHANNELS {
            return Err(Error::OutOfRange {
                field: "channel",
                value: i64::from(id),
                min: 0,
                max: i64::from(MAX_CHANNELS - 1),
            });
        }
        Ok(ChannelId(id))
    }

    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        ChannelId(crate::constants::DEFAULT_CHANNEL)
    }
}

impl TryFrom<u8> for ChannelId {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        ChannelId::new(id)
    }
}

impl From<ChannelId> for u8 {
    fn from(id: ChannelId) -> u8 {
        id.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Carrier clock settings: channel divisor plus carrier high/low times.
///
/// All three values are validated together; a `ClockConfig` only exists
/// when every field fits its register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockConfig {
    divisor: u8,
    high: u16,
    low: u16,
}

impl ClockConfig {
    /// Validate raw protocol values against the register widths.
    ///
    /// # Errors
    /// Returns `Error::OutOfRange` for the first field outside its range:
    /// divisor `1..=255`, high and low `1..=65535`.
    pub fn new(divisor: i64, high: i64, low: i64) -> Result<Self> {
        Ok(ClockConfig {
            divisor: check_range("divisor", divisor, MIN_CLOCK_DIVISOR, MAX_CLOCK_DIVISOR)?,
            high: check_range("high", high, MIN_CARRIER_TICKS, MAX_CARRIER_TICKS)?,
            low: check_range("low", low, MIN_CARRIER_TICKS, MAX_CARRIER_TICKS)?,
        })
    }

    #[must_use]
    pub fn divisor(&self) -> u8 {
        self.divisor
    }

    #[must_use]
    pub fn high(&self) -> u16 {
        self.high
    }

    #[must_use]
    pub fn low(&self) -> u16 {
        self.low
    }
}

impl fmt::Display for ClockConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "div={} high={} low={}", self.divisor, self.high, self.low)
    }
}

/// Narrow `value` to `T`, requiring `min <= value <= max`.
fn check_range<T>(field: &'static str, value: i64, min: T, max: T) -> Result<T>
where
    T: Copy + Into<i64> + TryFrom<i64>,
{
    let out_of_range = || Error::OutOfRange {
        field,
        value,
        min: min.into(),
        max: max.into(),
    };

    if !(min.into()..=max.into()).contains(&value) {
        return Err(out_of_range());
    }
    T::try_from(value).map_err(|_| out_of_range())
}
