//! Protocol error types.
//!
//! Framing corruption is deliberately absent here: a bad length or missing
//! terminator is recovered locally by the decoder's resync loop and surfaced
//! only as a diagnostic, never as an error value.

use thiserror::Error;

/// USB Pro protocol errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Payload too large for a single frame
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Response payload shorter than the decoded type requires
    #[error("short payload for label {label:#04x}: need {needed} bytes, got {got}")]
    ShortPayload {
        /// Frame label
        label: u8,
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },

    /// Connection already closed
    #[error("connection closed")]
    ConnectionClosed,

    /// IO error from the underlying byte channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
