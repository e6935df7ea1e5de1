//! Pulse train encoding.
//!
//! Each value of a transmit line becomes one pulse record: the sign picks
//! the output level (negative = low, otherwise high) and the magnitude is
//! the duration in channel ticks. Records are packed two per 32-bit item,
//! the layout the transmit peripheral reads from its memory:
//!
//! ```text
//!  31  30 ........ 16  15  14 ......... 0
//! +---+-------------+---+---------------+
//! |L1 |  duration1  |L0 |   duration0   |
//! +---+-------------+---+---------------+
//! ```
//!
//! Record `i` lives in item `i / 2`, slot `i % 2`. Writing an even slot
//! also fills the odd slot with a zero duration at the same level, so a
//! train with an odd number of records ends with a zero-length entry that
//! stops the peripheral cleanly.

use crate::field::{count_fields, read_field};
use bytes::{BufMut, Bytes, BytesMut};
use rmtpost_core::{
    Level,
    constants::{MAX_PULSE_DURATION, PULSE_DURATION_FIELD_MASK},
};
use thiserror::Error;

const DURATION_MASK: u32 = PULSE_DURATION_FIELD_MASK as u32;
const LEVEL_BIT: u32 = 15;
const SLOT_SHIFT: u32 = 16;

/// One (level, duration) half of a packed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PulseSlot {
    pub level: Level,
    pub duration: u16,
}

impl PulseSlot {
    /// Zero-length low slot.
    pub const EMPTY: PulseSlot = PulseSlot {
        level: Level::Low,
        duration: 0,
    };

    pub fn new(level: Level, duration: u16) -> Self {
        Self { level, duration }
    }

    fn to_bits(self) -> u32 {
        (u32::from(self.duration) & DURATION_MASK) | (self.level.as_bit() << LEVEL_BIT)
    }

    fn from_bits(bits: u32) -> Self {
        Self {
            level: Level::from((bits >> LEVEL_BIT) & 1 == 1),
            duration: (bits & DURATION_MASK) as u16,
        }
    }
}

/// Two pulse records packed into one 32-bit peripheral item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PulseItem {
    slots: [PulseSlot; 2],
}

impl PulseItem {
    pub const EMPTY: PulseItem = PulseItem {
        slots: [PulseSlot::EMPTY; 2],
    };

    pub fn new(first: PulseSlot, second: PulseSlot) -> Self {
        Self {
            slots: [first, second],
        }
    }

    pub fn first(&self) -> PulseSlot {
        self.slots[0]
    }

    pub fn second(&self) -> PulseSlot {
        self.slots[1]
    }

    /// Packed 32-bit representation.
    pub fn to_bits(&self) -> u32 {
        self.slots[0].to_bits() | (self.slots[1].to_bits() << SLOT_SHIFT)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self::new(
            PulseSlot::from_bits(bits & 0xFFFF),
            PulseSlot::from_bits(bits >> SLOT_SHIFT),
        )
    }
}

/// Packed pulse records ready for one transmission.
///
/// Sized for `ceil(n / 2)` items at construction. The buffer is owned by
/// the encoding call that built it and dropped once the transmission (or
/// its rejection) is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseBuffer {
    items: Vec<PulseItem>,
    records: usize,
}

impl PulseBuffer {
    /// Buffer able to hold `records` pulse records.
    pub fn for_records(records: usize) -> Self {
        Self {
            items: vec![PulseItem::EMPTY; records.div_ceil(2)],
            records,
        }
    }

    /// Store record `index`.
    ///
    /// An even index fills both slots of its item: the record itself and a
    /// zero-duration companion at the same level. An odd index only
    /// overwrites the companion slot.
    pub(crate) fn set(&mut self, index: usize, slot: PulseSlot) {
        debug_assert!(index < self.records, "record index out of range");
        let Some(item) = self.items.get_mut(index / 2) else {
            return;
        };

        if index % 2 == 0 {
            item.slots[0] = slot;
            item.slots[1] = PulseSlot::new(slot.level, 0);
        } else {
            item.slots[1] = slot;
        }
    }

    /// Number of pulse records (decoded values).
    pub fn record_count(&self) -> usize {
        self.records
    }

    pub fn items(&self) -> &[PulseItem] {
        &self.items
    }

    /// Record `index` in transmission order.
    pub fn record(&self, index: usize) -> Option<PulseSlot> {
        if index >= self.records {
            return None;
        }
        self.items.get(index / 2).map(|item| item.slots[index % 2])
    }

    /// Size of the packed item array in bytes.
    pub fn byte_len(&self) -> usize {
        self.items.len() * 4
    }

    /// Little-endian memory image of the packed items.
    pub fn to_le_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.byte_len());
        for item in &self.items {
            buf.put_u32_le(item.to_bits());
        }
        buf.freeze()
    }

    /// Total duration of all records, in channel ticks.
    pub fn total_ticks(&self) -> u64 {
        self.items
            .iter()
            .flat_map(|item| item.slots)
            .map(|slot| u64::from(slot.duration))
            .sum()
    }
}

/// Why a single field of a transmit line could not be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldFault {
    #[error("field {index} not found")]
    Missing { index: usize },

    #[error("field {index} duration {value} exceeds {max}", max = MAX_PULSE_DURATION)]
    DurationTooLong { index: usize, value: i64 },
}

impl FieldFault {
    pub fn index(&self) -> usize {
        match self {
            FieldFault::Missing { index } | FieldFault::DurationTooLong { index, .. } => *index,
        }
    }
}

/// A transmit line with at least one undecodable field.
///
/// Lists every faulty field, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {field_count} fields failed to decode", .faults.len())]
pub struct TransmitRejection {
    pub field_count: usize,
    pub faults: Vec<FieldFault>,
}

/// Encode a transmit line's value portion into a pulse buffer.
///
/// Every field is decoded even after a failure so that the rejection lists
/// all faults. If any field fails, nothing is returned for transmission.
///
/// # Examples
///
/// ```
/// use rmtpost_core::Level;
/// use rmtpost_protocol::encode_pulses;
///
/// let pulses = encode_pulses(b"100,-50,200").unwrap();
/// assert_eq!(pulses.items().len(), 2);
///
/// let last = pulses.items()[1];
/// assert_eq!((last.first().level, last.first().duration), (Level::High, 200));
/// assert_eq!((last.second().level, last.second().duration), (Level::High, 0));
///
/// assert!(encode_pulses(b"100,70000").is_err());
/// ```
pub fn encode_pulses(value: &[u8]) -> Result<PulseBuffer, TransmitRejection> {
    let field_count = count_fields(value);
    let mut buffer = PulseBuffer::for_records(field_count);
    let mut faults = Vec::new();

    for index in 0..field_count {
        let Some(number) = read_field(value, index) else {
            faults.push(FieldFault::Missing { index });
            continue;
        };

        match u16::try_from(number.unsigned_abs()) {
            Ok(duration) => {
                buffer.set(index, PulseSlot::new(Level::from_sign(number), duration));
            }
            _ => faults.push(FieldFault::DurationTooLong {
                index,
                value: number,
            }),
        }
    }

    if faults.is_empty() {
        Ok(buffer)
    } else {
        Err(TransmitRejection {
            field_count,
            faults,
        })
    }
}
