//! DMX universe buffer.

use crate::DMX_UNIVERSE_SIZE;

/// A full DMX512 universe: 512 channel values.
///
/// Every channel always has a defined value; the initial value is 0. Partial
/// updates merge into the existing state, so the buffer is the accumulated
/// view of all full and delta frames received so far.
#[derive(Clone, PartialEq, Eq)]
pub struct DmxBuffer {
    channels: [u8; DMX_UNIVERSE_SIZE],
}

impl DmxBuffer {
    /// Create a buffer with all channels at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            channels: [0; DMX_UNIVERSE_SIZE],
        }
    }

    /// Get a channel value, or `None` if the index is out of range.
    #[must_use]
    pub fn get_channel(&self, channel: usize) -> Option<u8> {
        self.channels.get(channel).copied()
    }

    /// Set a single channel. Out-of-range indices are ignored.
    pub fn set_channel(&mut self, channel: usize, value: u8) {
        if let Some(slot) = self.channels.get_mut(channel) {
            *slot = value;
        }
    }

    /// Overwrite a run of channels starting at `offset`, leaving the rest
    /// unchanged. Data past the end of the universe is dropped.
    pub fn set_range(&mut self, offset: usize, data: &[u8]) {
        if offset >= DMX_UNIVERSE_SIZE {
            return;
        }
        let len = data.len().min(DMX_UNIVERSE_SIZE - offset);
        self.channels[offset..offset + len].copy_from_slice(&data[..len]);
    }

    /// View the whole universe as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.channels
    }
}

impl Default for DmxBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DmxBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 512 zeros are not useful output; show the trailing-zero-trimmed view.
        let used = self
            .channels
            .iter()
            .rposition(|&v| v != 0)
            .map_or(0, |i| i + 1);
        f.debug_struct("DmxBuffer")
            .field("channels", &&self.channels[..used])
            .finish_non_exhaustive()
    }
}
