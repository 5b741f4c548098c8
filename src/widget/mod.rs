//! Widget layer: request/response dispatch and the Enttec device protocol.
//!
//! [`WidgetConnection`] owns one serial channel and routes decoded frames to a
//! pending request, an unsolicited handler, or the floor. [`EnttecUsbProWidget`]
//! composes a connection with the Enttec-specific payload semantics: parameter
//! get/set, receive-mode control, and full/delta DMX decoding.

mod connection;
mod dmx;
mod enttec;
mod params;

pub use connection::WidgetConnection;
pub use dmx::DmxBuffer;
pub use enttec::EnttecUsbProWidget;
pub use params::{PARAMETERS_PAYLOAD_SIZE, WidgetParameters};
