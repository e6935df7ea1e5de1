//! Transmit channel configuration.
//!
//! Describes how the channel is set up before the first request arrives.
//! Clock lines in a request may later change the divisor and carrier
//! timing at runtime; the idle level and carrier enable are fixed here.

use crate::error::{HardwareError, Result};
use rmtpost_core::{
    ChannelId, ClockConfig, Level,
    constants::{
        DEFAULT_CARRIER_DUTY_PERCENT, DEFAULT_CARRIER_FREQ_HZ, DEFAULT_CLOCK_DIVISOR,
        MAX_CARRIER_TICKS, MIN_CARRIER_TICKS, SOURCE_CLOCK_HZ,
    },
};
use serde::{Deserialize, Serialize};

/// Initial channel setup.
///
/// # Example
///
/// ```
/// use rmtpost_hardware::ChannelConfig;
///
/// let config = ChannelConfig::default();
/// assert_eq!(config.clock_divisor, 80);
/// assert_eq!(config.carrier_timing().unwrap(), (1000, 1000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Transmit channel.
    pub channel: ChannelId,

    /// Initial clock divisor (ticks = source clock / divisor).
    pub clock_divisor: u8,

    /// Carrier frequency in Hz.
    pub carrier_freq_hz: u32,

    /// Carrier duty cycle in percent.
    pub carrier_duty_percent: u8,

    /// Whether pulses are modulated onto the carrier.
    pub carrier_enabled: bool,

    /// Output level between transmissions.
    pub idle_level: Level,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel: ChannelId::default(),
            clock_divisor: DEFAULT_CLOCK_DIVISOR,
            carrier_freq_hz: DEFAULT_CARRIER_FREQ_HZ,
            carrier_duty_percent: DEFAULT_CARRIER_DUTY_PERCENT,
            carrier_enabled: true,
            idle_level: Level::Low,
        }
    }
}

impl ChannelConfig {
    /// Check the configuration for values the peripheral cannot take.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` for a zero divisor, a zero
    /// carrier frequency, or a duty cycle above 100 %.
    pub fn validate(&self) -> Result<()> {
        if self.clock_divisor == 0 {
            return Err(HardwareError::configuration("clock divisor must be 1-255"));
        }
        if self.carrier_freq_hz == 0 {
            return Err(HardwareError::configuration(
                "carrier frequency must be non-zero",
            ));
        }
        if self.carrier_duty_percent > 100 {
            return Err(HardwareError::configuration(format!(
                "carrier duty must be 0-100%, got {}",
                self.carrier_duty_percent
            )));
        }
        Ok(())
    }

    /// Carrier high/low times in source clock ticks.
    ///
    /// Each value is clamped to the 16-bit register range.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn carrier_timing(&self) -> Result<(u16, u16)> {
        self.validate()?;

        let period = SOURCE_CLOCK_HZ / self.carrier_freq_hz;
        let high = period * u32::from(self.carrier_duty_percent) / 100;
        let low = period - high;

        Ok((clamp_ticks(high), clamp_ticks(low)))
    }

    /// Initial clock configuration equivalent to a `c,` line.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn initial_clock(&self) -> Result<ClockConfig> {
        let (high, low) = self.carrier_timing()?;
        ClockConfig::new(self.clock_divisor.into(), high.into(), low.into())
            .map_err(|e| HardwareError::configuration(e.to_string()))
    }
}

fn clamp_ticks(ticks: u32) -> u16 {
    let clamped = ticks.clamp(MIN_CARRIER_TICKS.into(), MAX_CARRIER_TICKS.into());
    u16::try_from(clamped).unwrap_or(MAX_CARRIER_TICKS)
}
