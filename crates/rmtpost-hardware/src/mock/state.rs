//! Shared state and inspection handle for the mock peripheral.

use rmtpost_core::{ChannelId, Level};
use rmtpost_protocol::PulseItem;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Events kept by [`crate::mock::peripherals`]. Older events are dropped
/// once the log is full.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Observable peripheral operation, recorded in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralEvent {
    /// Status pin driven to a level.
    PinLevel(Level),

    /// Pulse train emitted to completion.
    Transmitted {
        channel: ChannelId,
        items: Vec<PulseItem>,
        byte_len: usize,
    },

    /// Clock divisor register written.
    DivisorWritten { channel: ChannelId, divisor: u8 },

    /// Carrier high/low registers written.
    CarrierSet {
        channel: ChannelId,
        high: u16,
        low: u16,
    },

    /// Carrier modulation switched on or off.
    CarrierEnabled { channel: ChannelId, enabled: bool },

    /// Output idle level written.
    IdleLevel { channel: ChannelId, level: Level },

    /// Scheduler delay served.
    Delayed(Duration),
}

#[derive(Debug)]
pub(crate) struct MockState {
    pub(crate) events: VecDeque<PeripheralEvent>,
    pub(crate) event_capacity: usize,
    pub(crate) divisor: u8,
    pub(crate) carrier: (u16, u16),
    pub(crate) carrier_enabled: bool,
    pub(crate) idle_level: Level,
    pub(crate) pin: Level,
    pub(crate) fail_transmit: bool,
    pub(crate) fail_register: bool,
}

impl MockState {
    /// Append an event, evicting the oldest ones beyond the capacity.
    pub(crate) fn record(&mut self, event: PeripheralEvent) {
        if self.event_capacity == 0 {
            return;
        }
        while self.events.len() >= self.event_capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

pub(crate) type SharedState = Arc<Mutex<MockState>>;

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for inspecting and steering the mock peripheral.
///
/// Cloneable; every clone observes the same devices.
#[derive(Debug, Clone)]
pub struct MockHandle {
    pub(crate) state: SharedState,
}

impl MockHandle {
    /// Operations recorded so far, oldest first. Only the most recent
    /// events up to the log capacity are kept.
    pub fn events(&self) -> Vec<PeripheralEvent> {
        lock(&self.state).events.iter().cloned().collect()
    }

    /// Forget recorded operations.
    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }

    /// Pulse trains emitted so far, in order.
    pub fn transmissions(&self) -> Vec<Vec<PulseItem>> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                PeripheralEvent::Transmitted { items, .. } => Some(items.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of divisor register writes so far.
    pub fn divisor_writes(&self) -> usize {
        lock(&self.state)
            .events
            .iter()
            .filter(|event| matches!(event, PeripheralEvent::DivisorWritten { .. }))
            .count()
    }

    /// Current clock divisor register.
    pub fn divisor(&self) -> u8 {
        lock(&self.state).divisor
    }

    /// Current carrier (high, low) registers.
    pub fn carrier(&self) -> (u16, u16) {
        lock(&self.state).carrier
    }

    pub fn carrier_enabled(&self) -> bool {
        lock(&self.state).carrier_enabled
    }

    /// Level the output rests at between trains.
    pub fn idle_level(&self) -> Level {
        lock(&self.state).idle_level
    }

    /// Current status pin level.
    pub fn pin_level(&self) -> Level {
        lock(&self.state).pin
    }

    /// Make every transmission fail until reset.
    pub fn set_transmit_failure(&self, fail: bool) {
        lock(&self.state).fail_transmit = fail;
    }

    /// Make every register write fail until reset.
    pub fn set_register_failure(&self, fail: bool) {
        lock(&self.state).fail_register = fail;
    }
}
