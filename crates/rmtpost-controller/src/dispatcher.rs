//! Command dispatcher.
//!
//! Executes the lines of one body, in order, against a peripheral context.
//! Lines never fail the request: validation rejections and hardware errors
//! are logged, recorded in the [`DispatchReport`], and the next line runs.

use crate::report::{DispatchReport, LineOutcome};
use rmtpost_core::Level;
use rmtpost_hardware::{CarrierClock, Peripherals, PulseTransmitter, Scheduler, StatusPin};
use rmtpost_protocol::{Command, Line, Lines, RequestBody, encode_pulses, parse_clock, parse_delay};
use tracing::{debug, info, trace, warn};

/// Runs request bodies against a [`Peripherals`] context.
///
/// The dispatcher owns the context, so one body is fully executed before
/// the next one can start.
///
/// # Examples
///
/// ```
/// use rmtpost_controller::{Dispatcher, LineOutcome};
/// use rmtpost_hardware::{ChannelConfig, mock};
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() {
///     let (peripherals, handle) = mock::peripherals(&ChannelConfig::default()).unwrap();
///     let mut dispatcher = Dispatcher::new(peripherals);
///
///     let report = dispatcher.dispatch_body(b"t,100,-50,200\nd,10\n").await;
///     assert!(matches!(report.lines()[0].outcome, LineOutcome::Transmitted { records: 3, .. }));
///     assert_eq!(handle.transmissions().len(), 1);
/// }
/// ```
#[derive(Debug)]
pub struct Dispatcher<T, C, P, S> {
    peripherals: Peripherals<T, C, P, S>,
}

impl<T, C, P, S> Dispatcher<T, C, P, S>
where
    T: PulseTransmitter,
    C: CarrierClock,
    P: StatusPin,
    S: Scheduler,
{
    pub fn new(peripherals: Peripherals<T, C, P, S>) -> Self {
        Self { peripherals }
    }

    pub fn peripherals(&self) -> &Peripherals<T, C, P, S> {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<T, C, P, S> {
        &mut self.peripherals
    }

    pub fn into_peripherals(self) -> Peripherals<T, C, P, S> {
        self.peripherals
    }

    /// Locate the body of a raw request and execute it.
    ///
    /// Returns `None` when the request has no blank line separating headers
    /// from a body. The caller is expected to have checked for `POST`.
    pub async fn dispatch_request(&mut self, request: &[u8]) -> Option<DispatchReport> {
        let Some(body) = RequestBody::locate(request) else {
            debug!(len = request.len(), "No body found in request");
            return None;
        };
        debug!(range = %body.range(), "Body located");
        Some(self.dispatch_body(body.as_bytes()).await)
    }

    /// Execute every line of a body in order.
    pub async fn dispatch_body(&mut self, body: &[u8]) -> DispatchReport {
        let mut report = DispatchReport::new();

        for line in Lines::new(body) {
            let outcome = self.execute_line(&line, &mut report).await;
            debug!(
                range = %line.range(),
                command = line.command().name(),
                outcome = %outcome,
                "Line processed"
            );
            report.push(line.range(), outcome);
        }

        report
    }

    async fn execute_line(&mut self, line: &Line<'_>, report: &mut DispatchReport) -> LineOutcome {
        match line.command() {
            Command::Clock(value) => self.configure_clock(value).await,
            Command::Transmit(value) => {
                self.drive_status(Level::High, report).await;
                let outcome = self.transmit(value).await;
                self.drive_status(Level::Low, report).await;
                outcome
            }
            Command::Delay(value) => match parse_delay(value) {
                Some(duration) => {
                    self.peripherals.scheduler.delay(duration).await;
                    LineOutcome::Delayed(duration)
                }
                None => LineOutcome::DelayIgnored,
            },
            Command::Unknown(_) => {
                trace!(tag = ?line.tag().map(char::from), "Ignoring line with unknown tag");
                LineOutcome::Unknown
            }
        }
    }

    async fn configure_clock(&mut self, value: &[u8]) -> LineOutcome {
        let clock = match parse_clock(value) {
            Ok(clock) => clock,
            Err(reason) => {
                debug!(%reason, "Clock line rejected");
                return LineOutcome::ClockRejected(reason);
            }
        };

        let channel = self.peripherals.channel();
        match self.peripherals.clock.apply_clock(channel, clock).await {
            Ok(divisor_changed) => {
                if divisor_changed {
                    info!(channel = %channel, %clock, "Clock divisor changed");
                } else {
                    debug!(channel = %channel, %clock, "Carrier updated, divisor unchanged");
                }
                LineOutcome::ClockApplied {
                    clock,
                    divisor_changed,
                }
            }
            Err(e) => {
                warn!(channel = %channel, %clock, error = %e, "Clock write failed");
                LineOutcome::HardwareFault {
                    command: "clock",
                    message: e.to_string(),
                }
            }
        }
    }

    async fn transmit(&mut self, value: &[u8]) -> LineOutcome {
        let pulses = match encode_pulses(value) {
            Ok(pulses) => pulses,
            Err(reason) => {
                let indices: Vec<usize> = reason.faults.iter().map(|fault| fault.index()).collect();
                debug!(%reason, failed_fields = ?indices, "Transmit line dropped");
                return LineOutcome::TransmitDropped(reason);
            }
        };

        for index in 0..pulses.record_count() {
            if let Some(slot) = pulses.record(index) {
                trace!(index, level = %slot.level, duration = slot.duration, "Pulse record");
            }
        }

        let channel = self.peripherals.channel();
        match self.peripherals.transmitter.write_items(channel, &pulses).await {
            Ok(()) => {
                debug!(
                    channel = %channel,
                    records = pulses.record_count(),
                    bytes = pulses.byte_len(),
                    "Pulse train transmitted"
                );
                LineOutcome::Transmitted {
                    records: pulses.record_count(),
                    bytes: pulses.byte_len(),
                }
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Transmission failed");
                LineOutcome::HardwareFault {
                    command: "transmit",
                    message: e.to_string(),
                }
            }
        }
    }

    async fn drive_status(&mut self, level: Level, report: &mut DispatchReport) {
        if let Err(e) = self.peripherals.status_pin.set_level(level).await {
            warn!(%level, error = %e, "Status pin write failed");
            report.record_pin_fault();
        }
    }
}
