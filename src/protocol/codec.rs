//! Streaming frame codec (encode/decode).
//!
//! Decoding is incremental: bytes arrive in arbitrary chunks, frames come out
//! in stream order. Corruption is recovered byte-by-byte: an invalid frame
//! candidate costs exactly one discarded byte before the scan resumes, so the
//! decoder converges onto the next valid `SOM` without waiting for bytes that
//! will never arrive.

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use super::{EOM, Error, FOOTER_SIZE, Frame, HEADER_SIZE, MAX_PAYLOAD_SIZE, Result, SOM};

/// Encode a frame to wire bytes.
///
/// # Format
///
/// ```text
/// [SOM (1)] [LABEL (1)] [LEN_LO (1)] [LEN_HI (1)] [PAYLOAD (LEN)] [EOM (1)]
/// ```
///
/// The length is the exact payload length, little-endian. Payload bytes are
/// written verbatim; the marker values need no escaping.
pub fn encode(label: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let len = payload.len();
    if len > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge {
            size: len,
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let mut bytes = Vec::with_capacity(HEADER_SIZE + len + FOOTER_SIZE);
    bytes.push(SOM);
    bytes.push(label);
    bytes.push((len & 0xff) as u8);
    bytes.push(((len >> 8) & 0xff) as u8);
    bytes.extend_from_slice(payload);
    bytes.push(EOM);

    Ok(bytes)
}

/// Incremental frame decoder.
///
/// Owns the accumulation buffer for one byte channel. [`feed`] appends raw
/// bytes, [`next_frame`] extracts the next complete frame if one is buffered.
/// The decoder holds no protocol semantics; it is purely a function of the
/// buffered bytes plus the configured maximum payload size.
///
/// [`feed`]: FrameDecoder::feed
/// [`next_frame`]: FrameDecoder::next_frame
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    max_payload: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with the default maximum payload size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_SIZE)
    }

    /// Create a decoder that accepts payloads up to `max_payload` bytes.
    #[must_use]
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_payload,
        }
    }

    /// Append raw bytes from the channel to the accumulation buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of bytes currently buffered.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Extract the next complete frame, if the buffer holds one.
    ///
    /// Returns `None` when more data is needed; an in-progress candidate is
    /// neither accepted nor discarded until its terminator position arrives.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            // Scan to the next SOM; anything before it is garbage.
            let Some(som) = self.buffer.iter().position(|&b| b == SOM) else {
                if !self.buffer.is_empty() {
                    trace!(bytes = self.buffer.len(), "discarding garbage, no SOM");
                    self.buffer.clear();
                }
                return None;
            };
            if som > 0 {
                trace!(bytes = som, "discarding garbage before SOM");
                self.buffer.advance(som);
            }

            // Partial header, wait for more data.
            if self.buffer.len() < HEADER_SIZE {
                return None;
            }

            let label = self.buffer[1];
            let len = usize::from(self.buffer[2]) | (usize::from(self.buffer[3]) << 8);

            if len > self.max_payload {
                // A length this large can never complete. Drop the SOM alone
                // and rescan from the next byte so resync stays byte-granular.
                debug!(label, len, max = self.max_payload, "oversize frame length");
                self.buffer.advance(1);
                continue;
            }

            let total = HEADER_SIZE + len + FOOTER_SIZE;
            if self.buffer.len() < total {
                return None;
            }

            if self.buffer[total - 1] != EOM {
                debug!(label, len, "missing frame terminator");
                self.buffer.advance(1);
                continue;
            }

            let mut frame = self.buffer.split_to(total);
            frame.advance(HEADER_SIZE);
            frame.truncate(len);
            return Some(Frame::new(label, frame.freeze()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut FrameDecoder) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = decoder.next_frame() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_encode_empty_frame() {
        assert_eq!(encode(0, &[]).unwrap(), vec![0x7e, 0x00, 0x00, 0x00, 0xe7]);
        assert_eq!(encode(10, &[]).unwrap(), vec![0x7e, 0x0a, 0x00, 0x00, 0xe7]);
    }

    #[test]
    fn test_encode_with_payload() {
        let bytes = encode(11, &[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert_eq!(
            bytes,
            vec![0x7e, 0x0b, 0x04, 0x00, 0xde, 0xad, 0xbe, 0xef, 0xe7]
        );
    }

    #[test]
    fn test_encode_length_split() {
        let payload = vec![0u8; 300];
        let bytes = encode(6, &payload).unwrap();
        assert_eq!(bytes[2], 0x2c); // 300 & 0xff
        assert_eq!(bytes[3], 0x01); // 300 >> 8
        assert_eq!(bytes.len(), 305);
    }

    #[test]
    fn test_encode_oversize_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD_SIZE + 1];
        let result = encode(6, &payload);
        assert!(matches!(result, Err(Error::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_decode_roundtrip() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&encode(11, &[0xde, 0xad, 0xbe, 0xef]).unwrap());

        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.label(), 11);
        assert_eq!(frame.payload().as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_decode_waits_for_partial_frame() {
        let mut decoder = FrameDecoder::new();
        let bytes = encode(11, &[0xde, 0xad, 0xbe, 0xef]).unwrap();

        // Everything except the terminator: no frame, nothing discarded.
        decoder.feed(&bytes[..bytes.len() - 1]);
        assert!(decoder.next_frame().is_none());
        assert_eq!(decoder.buffered(), bytes.len() - 1);

        decoder.feed(&bytes[bytes.len() - 1..]);
        assert!(decoder.next_frame().is_some());
    }

    #[test]
    fn test_decode_oversize_length_yields_no_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x7e, 0xff, 0xff, 0xff, 0xe7]);

        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_decode_oversize_length_discards_one_byte() {
        // A bogus header with a huge length field whose third byte is a real
        // SOM. Dropping only the leading SOM lets the decoder lock onto the
        // valid frame starting one byte later.
        let mut stream = vec![0x7e, 0x01];
        stream.extend_from_slice(&encode(3, &[0xaa]).unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.feed(&stream);

        // Outer candidate reads len = 0x037e, far over the maximum.
        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.label(), 3);
        assert_eq!(frame.payload().as_ref(), &[0xaa]);
    }

    #[test]
    fn test_decode_bad_terminator_discards_one_byte() {
        // First candidate parses as label 0x7e, len 0, but the byte at the
        // terminator offset is not EOM. One discarded byte later the second
        // SOM starts a valid empty frame.
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x7e, 0x7e, 0x00, 0x00, 0x00, 0xe7]);

        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.label(), 0);
        assert!(frame.payload().is_empty());
        assert!(decoder.next_frame().is_none());
    }

    #[test]
    fn test_decode_payload_may_contain_markers() {
        let mut decoder = FrameDecoder::new();
        decoder.feed(&[0x7e, 0x0a, 0x04, 0x00, 0xe7, 0xe7, 0x7e, 0xe7, 0xe7]);

        let frame = decoder.next_frame().unwrap();
        assert_eq!(frame.label(), 0x0a);
        assert_eq!(frame.payload().as_ref(), &[0xe7, 0xe7, 0x7e, 0xe7]);
    }

    /// The full corruption gauntlet: two good frames with noise, an oversize
    /// length, a frame whose payload is all marker bytes, and a missing
    /// terminator. Exactly three frames survive, in stream order.
    #[test]
    fn test_decode_corrupted_stream() {
        let data = [
            0x7e, 0x00, 0x00, 0x00, 0xe7, // empty frame
            0x7e, 0x0b, 0x04, 0x00, 0xde, 0xad, 0xbe, 0xef, 0xe7, // data frame
            0xaa, 0xbb, // noise
            0x7e, 0xff, 0xff, 0xff, 0xe7, // length too large
            0x7e, 0x0a, 0x04, 0x00, 0xe7, 0xe7, 0x7e, 0xe7, 0xe7, // markers in payload
            0x7e, 0x02, 0x04, 0x00, 0xde, 0xad, 0xbe, 0xef, 0xaa, // missing EOM
        ];

        let mut decoder = FrameDecoder::new();
        decoder.feed(&data);
        let frames = decode_all(&mut decoder);

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], Frame::new(0x00, Vec::new()));
        assert_eq!(frames[1], Frame::new(0x0b, vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(frames[2], Frame::new(0x0a, vec![0xe7, 0xe7, 0x7e, 0xe7]));
    }

    #[test]
    fn test_decode_resyncs_onto_embedded_som() {
        // A bad terminator whose payload contains a valid frame: after the
        // one-byte discards, the decoder locks onto the embedded SOM.
        let inner = encode(7, &[0x01, 0x02]).unwrap();
        let mut stream = vec![0x7e, 0x01, 0x0a, 0x00];
        stream.extend_from_slice(&inner);

        let mut decoder = FrameDecoder::new();
        decoder.feed(&stream);
        // The outer candidate wants 10 payload bytes and never gets a valid
        // terminator, so it cannot complete before the inner frame parses.
        decoder.feed(&[0u8; 16]);

        let frames = decode_all(&mut decoder);
        assert_eq!(frames, vec![Frame::new(7, vec![0x01, 0x02])]);
    }

    // Property-based tests
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn frame_strategy() -> impl Strategy<Value = (u8, Vec<u8>)> {
            (any::<u8>(), prop::collection::vec(any::<u8>(), 0..64))
        }

        proptest! {
            /// Property: any frame round-trips through encode and decode.
            #[test]
            fn prop_roundtrip((label, payload) in frame_strategy()) {
                let mut decoder = FrameDecoder::new();
                decoder.feed(&encode(label, &payload).unwrap());

                let frame = decoder.next_frame().unwrap();
                prop_assert_eq!(frame.label(), label);
                prop_assert_eq!(frame.payload().as_ref(), payload.as_slice());
                prop_assert!(decoder.next_frame().is_none());
            }

            /// Property: the emitted frame sequence is independent of how the
            /// stream is chunked.
            #[test]
            fn prop_chunk_size_independence(
                frames in prop::collection::vec(frame_strategy(), 1..8),
                noise in prop::collection::vec(any::<u8>(), 0..16),
                chunk_size in 1usize..32,
            ) {
                let mut stream = Vec::new();
                for (label, payload) in &frames {
                    stream.extend_from_slice(&encode(*label, payload).unwrap());
                }
                stream.extend_from_slice(&noise);

                let mut one_shot = FrameDecoder::new();
                one_shot.feed(&stream);
                let expected = decode_all(&mut one_shot);

                let mut chunked = FrameDecoder::new();
                let mut got = Vec::new();
                for chunk in stream.chunks(chunk_size) {
                    chunked.feed(chunk);
                    got.extend(decode_all(&mut chunked));
                }

                prop_assert_eq!(got, expected);
            }

            /// Property: leading garbage never affects the decoded frame.
            #[test]
            fn prop_garbage_prefix_skipped(
                garbage in prop::collection::vec(any::<u8>().prop_filter("no SOM", |&b| b != SOM), 0..32),
                (label, payload) in frame_strategy(),
            ) {
                let mut stream = garbage;
                stream.extend_from_slice(&encode(label, &payload).unwrap());

                let mut decoder = FrameDecoder::new();
                decoder.feed(&stream);

                let frame = decoder.next_frame().unwrap();
                prop_assert_eq!(frame.label(), label);
                prop_assert_eq!(frame.payload().as_ref(), payload.as_slice());
            }
        }
    }
}
