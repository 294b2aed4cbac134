//! Error types for sm-output.

use thiserror::Error;

/// Errors raised while setting up a transport or encoding a message.
///
/// Per-message delivery failures never surface here: they are counted in
/// `TransportStats::failed`.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("OSC encoding error: {0}")]
    Encode(String),

    #[error("cannot resolve target address {0:?}")]
    Address(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
