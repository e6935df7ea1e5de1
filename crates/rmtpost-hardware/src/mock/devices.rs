//! Mock implementations of the peripheral traits.
//!
//! The mock transmitter takes as long as the real channel would: the train's
//! total tick count times the tick period set by the current divisor. Under
//! a paused Tokio clock this costs no wall time.

use super::state::{PeripheralEvent, SharedState, lock};
use crate::error::{HardwareError, Result};
use crate::traits::{CarrierClock, PulseTransmitter, Scheduler, StatusPin};
use rmtpost_core::{ChannelId, Level, constants::SOURCE_CLOCK_HZ};
use rmtpost_protocol::PulseBuffer;
use std::time::Duration;
use tracing::{debug, trace};

/// Time the channel needs to emit `ticks` at the given divisor.
pub fn airtime(ticks: u64, divisor: u8) -> Duration {
    let nanos = ticks
        .saturating_mul(u64::from(divisor))
        .saturating_mul(1_000_000_000)
        / u64::from(SOURCE_CLOCK_HZ);
    Duration::from_nanos(nanos)
}

/// Mock pulse transmitter.
#[derive(Debug)]
pub struct MockTransmitter {
    pub(crate) state: SharedState,
}

impl PulseTransmitter for MockTransmitter {
    async fn write_items(&mut self, channel: ChannelId, pulses: &PulseBuffer) -> Result<()> {
        let (fail, divisor) = {
            let state = lock(&self.state);
            (state.fail_transmit, state.divisor)
        };
        if fail {
            return Err(HardwareError::transmit("simulated transmit failure"));
        }

        // Channel memory takes the packed little-endian item image
        let image = pulses.to_le_bytes();
        let duration = airtime(pulses.total_ticks(), divisor);
        debug!(
            channel = %channel,
            items = pulses.items().len(),
            bytes = image.len(),
            airtime_us = duration.as_micros() as u64,
            "Simulated transmission started"
        );
        tokio::time::sleep(duration).await;

        lock(&self.state).record(PeripheralEvent::Transmitted {
            channel,
            items: pulses.items().to_vec(),
            byte_len: image.len(),
        });
        Ok(())
    }

    async fn set_idle_level(&mut self, channel: ChannelId, level: Level) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_register {
            return Err(HardwareError::register("simulated idle level write failure"));
        }
        trace!(channel = %channel, %level, "Idle level written");
        state.idle_level = level;
        state.record(PeripheralEvent::IdleLevel { channel, level });
        Ok(())
    }
}

/// Mock clock divisor and carrier registers.
#[derive(Debug)]
pub struct MockClock {
    pub(crate) state: SharedState,
}

impl CarrierClock for MockClock {
    async fn clock_divisor(&self, _channel: ChannelId) -> Result<u8> {
        let state = lock(&self.state);
        if state.fail_register {
            return Err(HardwareError::register("simulated divisor read failure"));
        }
        Ok(state.divisor)
    }

    async fn set_clock_divisor(&mut self, channel: ChannelId, divisor: u8) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_register {
            return Err(HardwareError::register("simulated divisor write failure"));
        }
        trace!(channel = %channel, divisor, "Divisor register written");
        state.divisor = divisor;
        state.record(PeripheralEvent::DivisorWritten { channel, divisor });
        Ok(())
    }

    async fn set_carrier(&mut self, channel: ChannelId, high: u16, low: u16) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_register {
            return Err(HardwareError::register("simulated carrier write failure"));
        }
        trace!(channel = %channel, high, low, "Carrier registers written");
        state.carrier = (high, low);
        state.record(PeripheralEvent::CarrierSet { channel, high, low });
        Ok(())
    }

    async fn set_carrier_enabled(&mut self, channel: ChannelId, enabled: bool) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fail_register {
            return Err(HardwareError::register("simulated carrier enable failure"));
        }
        trace!(channel = %channel, enabled, "Carrier enable written");
        state.carrier_enabled = enabled;
        state.record(PeripheralEvent::CarrierEnabled { channel, enabled });
        Ok(())
    }
}

/// Mock status pin.
#[derive(Debug)]
pub struct MockStatusPin {
    pub(crate) state: SharedState,
}

impl StatusPin for MockStatusPin {
    async fn set_level(&mut self, level: Level) -> Result<()> {
        let mut state = lock(&self.state);
        state.pin = level;
        state.record(PeripheralEvent::PinLevel(level));
        Ok(())
    }
}

/// Mock scheduler. Sleeps on the Tokio timer and records each delay.
#[derive(Debug)]
pub struct MockScheduler {
    pub(crate) state: SharedState,
}

impl Scheduler for MockScheduler {
    async fn delay(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
        lock(&self.state).record(PeripheralEvent::Delayed(duration));
    }
}
