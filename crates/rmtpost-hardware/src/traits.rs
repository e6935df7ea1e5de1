//! Peripheral trait definitions.
//!
//! These traits are the contract between the command dispatcher and the
//! pulse-train peripheral it drives. Real drivers and the mock devices in
//! [`crate::mock`] both implement them, so the dispatcher can be tested
//! without hardware.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use rmtpost_core::{ChannelId, ClockConfig, Level};
use rmtpost_protocol::PulseBuffer;
use std::time::Duration;

/// Pulse transmit primitive.
///
/// Shifts a packed pulse train out of one channel.
///
/// # Examples
///
/// ```no_run
/// use rmtpost_core::ChannelId;
/// use rmtpost_hardware::traits::PulseTransmitter;
/// use rmtpost_hardware::error::Result;
/// use rmtpost_protocol::encode_pulses;
///
/// async fn blink<T: PulseTransmitter>(tx: &mut T) -> Result<()> {
///     let pulses = encode_pulses(b"500,-500,500,-500").expect("valid train");
///     tx.write_items(ChannelId::default(), &pulses).await
/// }
/// ```
pub trait PulseTransmitter: Send + Sync {
    /// Write `pulses` to the channel memory and wait until the hardware has
    /// finished emitting them.
    ///
    /// Completion is awaited so that two trains never overlap on a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The channel is still busy
    /// - The train does not fit the channel memory
    /// - The peripheral reports a transmit failure
    async fn write_items(&mut self, channel: ChannelId, pulses: &PulseBuffer) -> Result<()>;

    /// Set the level the output rests at between trains.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel configuration cannot be written.
    async fn set_idle_level(&mut self, channel: ChannelId, level: Level) -> Result<()>;
}

/// Clock write primitive: channel divisor and carrier timing registers.
pub trait CarrierClock: Send + Sync {
    /// Read the channel's current clock divisor.
    ///
    /// # Errors
    ///
    /// Returns an error if the register cannot be read.
    async fn clock_divisor(&self, channel: ChannelId) -> Result<u8>;

    /// Write a new clock divisor.
    ///
    /// # Errors
    ///
    /// Returns an error if the register write fails.
    async fn set_clock_divisor(&mut self, channel: ChannelId, divisor: u8) -> Result<()>;

    /// Write the carrier high and low times. The enable bit is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the register write fails.
    async fn set_carrier(&mut self, channel: ChannelId, high: u16, low: u16) -> Result<()>;

    /// Turn carrier modulation on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the register write fails.
    async fn set_carrier_enabled(&mut self, channel: ChannelId, enabled: bool) -> Result<()>;

    /// Write a clock configuration's registers.
    ///
    /// The divisor register is written only when it differs from the
    /// current value; the carrier times are always written. Returns whether
    /// the divisor changed.
    ///
    /// # Errors
    ///
    /// Returns the first register error encountered.
    async fn write_clock(&mut self, channel: ChannelId, config: ClockConfig) -> Result<bool> {
        let previous = self.clock_divisor(channel).await?;
        let changed = previous != config.divisor();
        if changed {
            self.set_clock_divisor(channel, config.divisor()).await?;
        }
        self.set_carrier(channel, config.high(), config.low()).await?;
        Ok(changed)
    }

    /// Apply a clock line: [`write_clock`](Self::write_clock), then turn
    /// the carrier on.
    ///
    /// # Errors
    ///
    /// Returns the first register error encountered.
    async fn apply_clock(&mut self, channel: ChannelId, config: ClockConfig) -> Result<bool> {
        let changed = self.write_clock(channel, config).await?;
        self.set_carrier_enabled(channel, true).await?;
        Ok(changed)
    }
}

/// Digital output used as an activity indicator.
pub trait StatusPin: Send + Sync {
    /// Drive the pin to `level`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be driven.
    async fn set_level(&mut self, level: Level) -> Result<()>;
}

/// Scheduler delay primitive.
pub trait Scheduler: Send + Sync {
    /// Yield the calling task for approximately `duration`.
    async fn delay(&mut self, duration: Duration);
}

/// Scheduler backed by the Tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    async fn delay(&mut self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
