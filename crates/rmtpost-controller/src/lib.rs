//! Command execution for the RMT request server.
//!
//! Ties the protocol crate to the peripheral traits: a [`Dispatcher`] walks
//! the lines of a body, applies clock lines, emits transmit lines bracketed
//! by the status pin, serves delay lines, and ignores everything else. What
//! happened to each line is returned as a [`DispatchReport`].

pub mod dispatcher;
pub mod report;

pub use dispatcher::Dispatcher;
pub use report::{DispatchReport, DispatchSummary, LineOutcome, LineReport};
