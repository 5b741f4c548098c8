//! Frame value type.

use bytes::Bytes;

use super::Label;

/// One complete, delimited protocol message: a label plus its payload.
///
/// Frames are wire-only values; the dispatch layer consumes them as soon as
/// they complete parsing. Cloning is cheap (the payload is a [`Bytes`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    label: u8,
    payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(label: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            label,
            payload: payload.into(),
        }
    }

    /// Get the raw label byte.
    #[must_use]
    pub const fn label(&self) -> u8 {
        self.label
    }

    /// Interpret the label as one of the known widget labels.
    ///
    /// The codec is label-agnostic; unknown labels are still valid frames.
    #[must_use]
    pub fn label_kind(&self) -> Option<Label> {
        Label::from_u8(self.label)
    }

    /// Get the payload.
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Encode this frame to wire bytes.
    pub fn encode(&self) -> super::Result<Vec<u8>> {
        super::encode(self.label, &self.payload)
    }
}
