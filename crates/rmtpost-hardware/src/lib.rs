//! Peripheral abstraction layer for the RMT request server.
//!
//! This crate defines the four primitives the command dispatcher drives:
//! a pulse transmitter, the channel's clock and carrier registers, a status
//! pin, and a scheduler delay. Real drivers and the [`mock`] devices both
//! implement them, so request handling can be exercised without hardware.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All operations use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: Fallible operations return `Result<T>` with a
//!   [`HardwareError`] describing which primitive failed.
//!
//! # Example
//!
//! ```no_run
//! use rmtpost_core::Level;
//! use rmtpost_hardware::traits::{PulseTransmitter, StatusPin};
//! use rmtpost_hardware::{Peripherals, Result};
//! use rmtpost_hardware::traits::{CarrierClock, Scheduler};
//! use rmtpost_protocol::PulseBuffer;
//!
//! async fn send<T, C, P, S>(p: &mut Peripherals<T, C, P, S>, pulses: &PulseBuffer) -> Result<()>
//! where
//!     T: PulseTransmitter,
//!     C: CarrierClock,
//!     P: StatusPin,
//!     S: Scheduler,
//! {
//!     let channel = p.channel();
//!     p.status_pin.set_level(Level::High).await?;
//!     let result = p.transmitter.write_items(channel, pulses).await;
//!     p.status_pin.set_level(Level::Low).await?;
//!     result
//! }
//! ```
//!
//! # Mock Implementations
//!
//! [`mock::peripherals`] builds a full peripheral context plus a
//! [`mock::MockHandle`] that records every register write, pin change,
//! transmission and delay, and can inject transmit or register failures.

pub mod config;
pub mod error;
pub mod mock;
pub mod peripherals;
pub mod traits;

// Re-export commonly used types for convenience
pub use config::ChannelConfig;
pub use error::{HardwareError, Result};
pub use peripherals::Peripherals;
pub use traits::{CarrierClock, PulseTransmitter, Scheduler, StatusPin, TokioScheduler};
