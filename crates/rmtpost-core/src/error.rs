use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Range errors
    #[error("Invalid byte range {start}..{end} for buffer of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("{field} out of range: {value} (expected {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
