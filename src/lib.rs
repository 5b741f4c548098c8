//! Transport and protocol layer for Enttec-style USB DMX widgets.
//!
//! A USB Pro widget exposes nothing but a raw serial byte stream. This library
//! turns that stream into discrete labelled frames, correlates outgoing
//! requests with their asynchronous replies, and decodes the device payloads
//! (widget parameters, full and delta DMX universes) into a typed, queryable
//! widget state.
//!
//! # Quick Start
//!
//! ```rust
//! use usbpro::EnttecUsbProWidget;
//!
//! // The widget writes outgoing frames into anything that is `io::Write`;
//! // a serial port in production, a `Vec<u8>` in tests.
//! let mut widget = EnttecUsbProWidget::new(Vec::new());
//!
//! widget.set_dmx_callback(|| println!("universe updated"));
//! widget.change_to_receive_mode(true)?;
//!
//! // Bytes read from the port are pushed in; callbacks fire synchronously.
//! widget.on_bytes_received(&[0x7e, 0x05, 0x03, 0x00, 0x00, 0x00, 0xff, 0xe7]);
//! assert_eq!(widget.fetch_dmx().get_channel(0), Some(255));
//! # Ok::<(), usbpro::Error>(())
//! ```
//!
//! # Design
//!
//! - **Byte-granular resynchronization** - a corrupted frame costs at most one
//!   discarded byte per resync attempt, so the decoder converges onto the next
//!   valid start-of-message even mid-garbage.
//! - **Single-threaded, callback-driven** - all decode and dispatch work runs
//!   synchronously inside [`EnttecUsbProWidget::on_bytes_received`]; nothing
//!   blocks waiting for a device reply.
//! - **One pending request per connection** - request/response correlation is
//!   a single typed slot, cleared exactly once by a response or a disconnect.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod protocol;
pub mod widget;

pub use protocol::{
    EOM, Error, Frame, FrameDecoder, HEADER_SIZE, Label, MAX_PAYLOAD_SIZE, Result, SOM, encode,
};
pub use widget::{DmxBuffer, EnttecUsbProWidget, WidgetConnection, WidgetParameters};

/// Number of channels in a DMX512 universe.
pub const DMX_UNIVERSE_SIZE: usize = 512;
