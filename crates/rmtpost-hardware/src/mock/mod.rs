//! Mock peripheral for testing and development.
//!
//! This module provides simulated devices that record every operation and
//! can be told to fail, so the dispatcher and the HTTP listener can run
//! without a transmit peripheral attached.

pub mod devices;
pub mod state;

pub use devices::{MockClock, MockScheduler, MockStatusPin, MockTransmitter, airtime};
pub use state::{DEFAULT_EVENT_CAPACITY, MockHandle, PeripheralEvent};

use crate::config::ChannelConfig;
use crate::error::Result;
use crate::peripherals::Peripherals;
use rmtpost_core::Level;
use state::MockState;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Peripheral context built from mock devices.
pub type MockPeripherals = Peripherals<MockTransmitter, MockClock, MockStatusPin, MockScheduler>;

/// Create a mock peripheral whose registers start at the configured values.
///
/// Returns a tuple of (MockPeripherals, MockHandle) where the handle can be
/// used to inspect recorded operations and inject failures. No events are
/// recorded for the initial register state. The event log keeps the last
/// [`DEFAULT_EVENT_CAPACITY`] operations.
///
/// # Errors
///
/// Returns an error if the channel configuration is invalid.
///
/// # Examples
///
/// ```
/// use rmtpost_hardware::{ChannelConfig, mock};
///
/// let (_peripherals, handle) = mock::peripherals(&ChannelConfig::default()).unwrap();
/// assert_eq!(handle.carrier(), (1000, 1000));
/// assert!(handle.events().is_empty());
/// ```
pub fn peripherals(config: &ChannelConfig) -> Result<(MockPeripherals, MockHandle)> {
    peripherals_with_capacity(config, DEFAULT_EVENT_CAPACITY)
}

/// Like [`peripherals`], keeping at most `event_capacity` recorded events.
/// A capacity of zero records nothing.
///
/// # Errors
///
/// Returns an error if the channel configuration is invalid.
pub fn peripherals_with_capacity(
    config: &ChannelConfig,
    event_capacity: usize,
) -> Result<(MockPeripherals, MockHandle)> {
    let carrier = config.carrier_timing()?;

    let state = Arc::new(Mutex::new(MockState {
        events: VecDeque::with_capacity(event_capacity.min(DEFAULT_EVENT_CAPACITY)),
        event_capacity,
        divisor: config.clock_divisor,
        carrier,
        carrier_enabled: config.carrier_enabled,
        idle_level: config.idle_level,
        pin: Level::Low,
        fail_transmit: false,
        fail_register: false,
    }));

    let peripherals = Peripherals::new(
        config.channel,
        MockTransmitter {
            state: Arc::clone(&state),
        },
        MockClock {
            state: Arc::clone(&state),
        },
        MockStatusPin {
            state: Arc::clone(&state),
        },
        MockScheduler {
            state: Arc::clone(&state),
        },
    );

    Ok((peripherals, MockHandle { state }))
}
