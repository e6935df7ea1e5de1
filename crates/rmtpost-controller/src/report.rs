//! Per-request diagnostics.
//!
//! The HTTP response never reveals what happened to a body. The report is
//! how callers and tests find out.

use rmtpost_core::{ByteRange, ClockConfig};
use rmtpost_protocol::{ClockRejection, TransmitRejection};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// What happened to one line of a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Clock line written to the peripheral.
    ClockApplied {
        clock: ClockConfig,
        divisor_changed: bool,
    },

    /// Clock line failed validation; no register was touched.
    ClockRejected(ClockRejection),

    /// Pulse train emitted.
    Transmitted { records: usize, bytes: usize },

    /// Transmit line had undecodable fields; nothing was emitted.
    TransmitDropped(TransmitRejection),

    /// Scheduler delay served.
    Delayed(Duration),

    /// Delay line without a positive duration.
    DelayIgnored,

    /// Line with no recognised tag.
    Unknown,

    /// The peripheral refused a valid command.
    HardwareFault {
        command: &'static str,
        message: String,
    },
}

impl LineOutcome {
    /// Whether the line was dropped before reaching the peripheral.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            LineOutcome::ClockRejected(_) | LineOutcome::TransmitDropped(_)
        )
    }
}

impl fmt::Display for LineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineOutcome::ClockApplied {
                clock,
                divisor_changed: true,
            } => write!(f, "clock applied ({clock})"),
            LineOutcome::ClockApplied { clock, .. } => {
                write!(f, "clock applied, divisor unchanged ({clock})")
            }
            LineOutcome::ClockRejected(reason) => write!(f, "clock rejected: {reason}"),
            LineOutcome::Transmitted { records, bytes } => {
                write!(f, "transmitted {records} records ({bytes} bytes)")
            }
            LineOutcome::TransmitDropped(reason) => write!(f, "transmit dropped: {reason}"),
            LineOutcome::Delayed(duration) => write!(f, "delayed {} ms", duration.as_millis()),
            LineOutcome::DelayIgnored => write!(f, "delay ignored"),
            LineOutcome::Unknown => write!(f, "unknown tag"),
            LineOutcome::HardwareFault { command, message } => {
                write!(f, "{command} failed: {message}")
            }
        }
    }
}

/// One processed line and where it sits in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    pub range: ByteRange,
    pub outcome: LineOutcome,
}

/// Outcome of every non-empty line of one body, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    lines: Vec<LineReport>,
    pin_faults: usize,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, range: ByteRange, outcome: LineOutcome) {
        self.lines.push(LineReport { range, outcome });
    }

    pub(crate) fn record_pin_fault(&mut self) {
        self.pin_faults += 1;
    }

    pub fn lines(&self) -> &[LineReport] {
        &self.lines
    }

    /// Outcomes in line order.
    pub fn outcomes(&self) -> impl Iterator<Item = &LineOutcome> {
        self.lines.iter().map(|line| &line.outcome)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Status pin writes that failed while bracketing transmit lines.
    pub fn pin_faults(&self) -> usize {
        self.pin_faults
    }

    pub fn summary(&self) -> DispatchSummary {
        let mut summary = DispatchSummary {
            lines: self.lines.len(),
            pin_faults: self.pin_faults,
            ..Default::default()
        };
        for outcome in self.outcomes() {
            match outcome {
                LineOutcome::Transmitted { .. } => summary.transmitted += 1,
                LineOutcome::ClockApplied { .. } => summary.clocks_applied += 1,
                LineOutcome::Delayed(_) => summary.delays += 1,
                LineOutcome::HardwareFault { .. } => summary.hardware_faults += 1,
                LineOutcome::Unknown | LineOutcome::DelayIgnored => summary.ignored += 1,
                other if other.is_rejected() => summary.rejected += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Line counts of a [`DispatchReport`], by outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub lines: usize,
    pub transmitted: usize,
    pub clocks_applied: usize,
    pub delays: usize,
    pub rejected: usize,
    pub ignored: usize,
    pub hardware_faults: usize,
    pub pin_faults: usize,
}
