//! USB Pro wire protocol: frame layout, labels, and the streaming codec.
//!
//! The wire format is `SOM | LABEL | LEN_LO | LEN_HI | PAYLOAD | EOM` with an
//! explicit little-endian length; payload bytes are never escaped and may
//! contain the marker values freely.

mod codec;
mod error;
mod frame;
mod label;

pub use codec::{FrameDecoder, encode};
pub use error::{Error, Result};
pub use frame::Frame;
pub use label::Label;

/// Start-of-message marker.
pub const SOM: u8 = 0x7e;

/// End-of-message marker.
pub const EOM: u8 = 0xe7;

/// Header size in bytes (SOM + label + two length bytes).
pub const HEADER_SIZE: usize = 4;

/// Footer size in bytes (EOM).
pub const FOOTER_SIZE: usize = 1;

/// Maximum payload size accepted by the codec.
///
/// Matches the receive buffer of the physical widgets; a length field larger
/// than this can never complete, so the decoder rejects it immediately.
pub const MAX_PAYLOAD_SIZE: usize = 600;
