//! Request dispatch over one serial channel.

use std::io::Write;

use tracing::{debug, warn};

use crate::protocol::{Error, Frame, FrameDecoder, Result, encode};

/// Callback invoked when a pending request completes.
///
/// The first argument is `true` for a matching response frame and `false`
/// when the connection closed before one arrived (the payload is then empty).
type ResponseCallback = Box<dyn FnOnce(bool, &[u8])>;

/// The single outstanding request slot.
struct PendingRequest {
    label: u8,
    on_response: ResponseCallback,
}

/// One open connection to a widget: the byte channel, the frame decoder, and
/// the request/response correlation state.
///
/// The connection supports exactly one outstanding request at a time;
/// responses are matched to it by label. Frames that match no pending request
/// go to the unsolicited handler, or are dropped with a diagnostic.
///
/// All dispatch happens synchronously inside [`on_bytes_received`]; callers
/// own the event loop and push bytes in as they arrive.
///
/// [`on_bytes_received`]: WidgetConnection::on_bytes_received
pub struct WidgetConnection<W: Write> {
    transport: W,
    decoder: FrameDecoder,
    pending: Option<PendingRequest>,
    on_unsolicited: Option<Box<dyn FnMut(&Frame)>>,
    on_remove: Option<Box<dyn FnOnce()>>,
    closed: bool,
}

impl<W: Write> WidgetConnection<W> {
    /// Create a connection over the given byte channel.
    pub fn new(transport: W) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            pending: None,
            on_unsolicited: None,
            on_remove: None,
            closed: false,
        }
    }

    /// Register the handler for frames that match no pending request.
    pub fn set_unsolicited_handler(&mut self, handler: impl FnMut(&Frame) + 'static) {
        self.on_unsolicited = Some(Box::new(handler));
    }

    /// Register the callback fired once when the connection goes away.
    pub fn set_on_remove(&mut self, callback: impl FnOnce() + 'static) {
        self.on_remove = Some(Box::new(callback));
    }

    /// Encode and transmit one frame.
    ///
    /// Fails without performing any I/O if the payload exceeds the maximum
    /// frame size or the connection is already closed.
    pub fn send(&mut self, label: u8, payload: &[u8]) -> Result<()> {
        if self.closed {
            return Err(Error::ConnectionClosed);
        }
        let bytes = encode(label, payload)?;
        self.transport.write_all(&bytes)?;
        Ok(())
    }

    /// Transmit a request frame and await a response under the same label.
    ///
    /// Installs the pending-request slot on successful transmission. The
    /// callback fires exactly once: with the response payload, or with
    /// `false` if the connection closes first. A request issued while another
    /// is pending overwrites the slot and drops the earlier callback; higher
    /// layers are responsible for not overlapping calls.
    pub fn send_and_await(
        &mut self,
        label: u8,
        payload: &[u8],
        on_response: impl FnOnce(bool, &[u8]) + 'static,
    ) -> Result<()> {
        self.send(label, payload)?;
        let previous = self.pending.replace(PendingRequest {
            label,
            on_response: Box::new(on_response),
        });
        if previous.is_some() {
            warn!(label, "overwriting pending request");
        }
        Ok(())
    }

    /// Push bytes read from the channel into the decoder and dispatch every
    /// frame that completes, in stream order.
    pub fn on_bytes_received(&mut self, bytes: &[u8]) {
        self.decoder.feed(bytes);
        while let Some(frame) = self.decoder.next_frame() {
            self.dispatch(&frame);
        }
    }

    /// Signal that the peer closed the channel or an I/O error is fatal.
    ///
    /// Idempotent: the first call fails any pending request and then fires
    /// the on-remove callback; later calls do nothing. After this the
    /// connection is permanently unusable, except that already-decoded state
    /// held by higher layers stays readable.
    pub fn on_connection_closed(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Some(pending) = self.pending.take() {
            (pending.on_response)(false, &[]);
        }
        if let Some(on_remove) = self.on_remove.take() {
            on_remove();
        }
    }

    /// Whether the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Borrow the underlying byte channel.
    pub fn transport(&self) -> &W {
        &self.transport
    }

    /// Mutably borrow the underlying byte channel.
    pub fn transport_mut(&mut self) -> &mut W {
        &mut self.transport
    }

    fn dispatch(&mut self, frame: &Frame) {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.label == frame.label())
        {
            let pending = self.pending.take().expect("pending slot checked above");
            (pending.on_response)(true, frame.payload());
            return;
        }

        if let Some(handler) = self.on_unsolicited.as_mut() {
            handler(frame);
        } else {
            debug!(
                label = frame.label(),
                len = frame.payload().len(),
                "dropping frame with no handler"
            );
        }
    }
}
