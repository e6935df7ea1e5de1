//! Parsing and encoding for the RMT command protocol.
//!
//! Everything in this crate is pure: it reads borrowed request bytes and
//! produces values, never touching the peripheral. The controller crate
//! executes the results.
//!
//! ```
//! use rmtpost_protocol::{Command, RequestBody, encode_pulses};
//!
//! let request = b"POST /rmt HTTP/1.1\r\nHost: esp32\r\n\r\nt,100,-50,200\n";
//! let body = RequestBody::locate(request).unwrap();
//! let line = body.lines().next().unwrap();
//!
//! let Command::Transmit(values) = line.command() else { panic!() };
//! let pulses = encode_pulses(values).unwrap();
//! assert_eq!(pulses.record_count(), 3);
//! assert_eq!(pulses.items().len(), 2);
//! ```

pub mod body;
pub mod clock;
pub mod command;
pub mod field;
pub mod line;
pub mod pulse;

pub use body::{RequestBody, is_post, locate_body};
pub use clock::{ClockRejection, parse_clock};
pub use command::{Command, parse_delay};
pub use field::{FieldScanner, count_fields, read_field};
pub use line::{Line, Lines};
pub use pulse::{FieldFault, PulseBuffer, PulseItem, PulseSlot, TransmitRejection, encode_pulses};
