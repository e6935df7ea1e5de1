//! Error types for peripheral operations.
//!
//! This module defines error types for failures while driving the transmit
//! channel, its clock registers, the status pin, or the scheduler.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Pulse transmission failed or was aborted.
    #[error("Transmit error: {message}")]
    TransmitError { message: String },

    /// Clock or carrier register access failed.
    #[error("Register error: {message}")]
    RegisterError { message: String },

    /// Status pin could not be driven.
    #[error("Pin error: {message}")]
    PinError { message: String },

    /// Channel configuration rejected.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl HardwareError {
    /// Create a new transmit error.
    pub fn transmit(message: impl Into<String>) -> Self {
        Self::TransmitError {
            message: message.into(),
        }
    }

    /// Create a new register error.
    pub fn register(message: impl Into<String>) -> Self {
        Self::RegisterError {
            message: message.into(),
        }
    }

    /// Create a new pin error.
    pub fn pin(message: impl Into<String>) -> Self {
        Self::PinError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}
