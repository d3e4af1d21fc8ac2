// Error type shared by the differ, the line projector and the file helpers.

use thiserror::Error;

/// Errors produced while differencing or projecting byte streams.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A read or seek on an underlying byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source cannot be used (e.g. it does not support seeking) or a
    /// script does not fit the base it is applied to.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Cooperative cancellation was requested mid-scan.
    #[error("operation cancelled")]
    Cancelled,

    /// A configuration value lies outside its accepted range.
    #[error("{name} must be in {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

pub type Result<T> = std::result::Result<T, DiffError>;
