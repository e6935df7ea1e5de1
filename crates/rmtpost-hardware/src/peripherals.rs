//! Peripheral context handed to the command dispatcher.
//!
//! Bundles the transmit channel with the four primitives the dispatcher
//! needs. The context is passed by `&mut` into each request, so the current
//! divisor register and pin level are the only state shared between
//! requests and no locking is needed while one request runs.

use crate::config::ChannelConfig;
use crate::error::Result;
use crate::traits::{CarrierClock, PulseTransmitter, Scheduler, StatusPin};
use rmtpost_core::{ChannelId, Level};
use tracing::{debug, info};

/// Transmit channel plus its clock, status pin, and scheduler.
///
/// # Examples
///
/// ```
/// use rmtpost_hardware::{ChannelConfig, mock};
///
/// #[tokio::main]
/// async fn main() -> rmtpost_hardware::Result<()> {
///     let config = ChannelConfig::default();
///     let (mut peripherals, handle) = mock::peripherals(&config)?;
///
///     peripherals.initialize(&config).await?;
///     assert_eq!(handle.divisor(), 80);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Peripherals<T, C, P, S> {
    channel: ChannelId,
    pub transmitter: T,
    pub clock: C,
    pub status_pin: P,
    pub scheduler: S,
}

impl<T, C, P, S> Peripherals<T, C, P, S>
where
    T: PulseTransmitter,
    C: CarrierClock,
    P: StatusPin,
    S: Scheduler,
{
    pub fn new(channel: ChannelId, transmitter: T, clock: C, status_pin: P, scheduler: S) -> Self {
        Self {
            channel,
            transmitter,
            clock,
            status_pin,
            scheduler,
        }
    }

    /// Channel every command is applied to.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Bring the channel to its configured initial state and clear the
    /// status pin.
    ///
    /// Writes the clock registers, the carrier enable bit and the idle
    /// level from `config`, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a register or
    /// pin write fails.
    pub async fn initialize(&mut self, config: &ChannelConfig) -> Result<()> {
        let clock = config.initial_clock()?;
        let changed = self.clock.write_clock(self.channel, clock).await?;
        debug!(
            channel = %self.channel,
            %clock,
            divisor_changed = changed,
            "Channel clock initialized"
        );
        self.clock
            .set_carrier_enabled(self.channel, config.carrier_enabled)
            .await?;
        self.transmitter
            .set_idle_level(self.channel, config.idle_level)
            .await?;

        self.status_pin.set_level(Level::Low).await?;

        info!(
            channel = %self.channel,
            carrier_hz = config.carrier_freq_hz,
            duty = config.carrier_duty_percent,
            carrier_enabled = config.carrier_enabled,
            idle_level = %config.idle_level,
            "Transmit channel ready"
        );
        Ok(())
    }
}
