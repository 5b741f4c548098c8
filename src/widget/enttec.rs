//! Enttec USB Pro device protocol.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::DMX_UNIVERSE_SIZE;
use crate::protocol::{Frame, Label, Result};

use super::{DmxBuffer, WidgetConnection, WidgetParameters};

/// The only start code treated as a DMX universe.
const DMX_NULL_START_CODE: u8 = 0;

/// Bytes of presence bitmask in a change-of-state frame (40 slots per page).
const COS_BITMASK_BYTES: usize = 5;

/// Offset of the first literal value byte in a change-of-state payload.
const COS_DATA_OFFSET: usize = 1 + COS_BITMASK_BYTES;

/// Input state shared between the widget and the unsolicited-frame handler.
struct InputState {
    dmx: RefCell<DmxBuffer>,
    on_dmx: RefCell<Option<Box<dyn FnMut()>>>,
}

/// An Enttec USB Pro widget over one serial channel.
///
/// Composes a [`WidgetConnection`] with the device-specific payload
/// semantics: parameter get/set, receive-mode control, and decoding of the
/// unsolicited full and delta DMX frames into the input universe.
///
/// ```rust
/// use usbpro::EnttecUsbProWidget;
///
/// let mut widget = EnttecUsbProWidget::new(Vec::new());
/// widget.set_parameters(9, 63, 20)?;
/// # Ok::<(), usbpro::Error>(())
/// ```
pub struct EnttecUsbProWidget<W: Write> {
    connection: WidgetConnection<W>,
    input: Rc<InputState>,
}

impl<W: Write> EnttecUsbProWidget<W> {
    /// Create a widget over the given byte channel.
    pub fn new(transport: W) -> Self {
        let mut connection = WidgetConnection::new(transport);
        let input = Rc::new(InputState {
            dmx: RefCell::new(DmxBuffer::new()),
            on_dmx: RefCell::new(None),
        });

        let handler_state = Rc::clone(&input);
        connection.set_unsolicited_handler(move |frame| handler_state.handle_frame(frame));

        Self { connection, input }
    }

    /// Request the widget's device parameters.
    ///
    /// The callback fires exactly once: `(true, params)` when the response
    /// arrives, `(false, default)` if the connection closes first or the
    /// response payload is malformed.
    pub fn get_parameters(
        &mut self,
        callback: impl FnOnce(bool, WidgetParameters) + 'static,
    ) -> Result<()> {
        // The request carries two placeholder bytes the device ignores.
        self.connection.send_and_await(
            Label::GetParameters.as_u8(),
            &[0, 0],
            move |ok, payload| {
                if !ok {
                    callback(false, WidgetParameters::default());
                    return;
                }
                match WidgetParameters::from_payload(payload) {
                    Ok(params) => callback(true, params),
                    Err(_) => callback(false, WidgetParameters::default()),
                }
            },
        )
    }

    /// Update the widget's device parameters. Fire-and-forget.
    pub fn set_parameters(&mut self, break_time: u8, mab_time: u8, rate: u8) -> Result<()> {
        let payload = [0, 0, break_time, mab_time, rate];
        self.connection.send(Label::SetParameters.as_u8(), &payload)
    }

    /// Switch the widget's receive mode. Fire-and-forget.
    ///
    /// With `change_only` set the widget sends delta (change of state)
    /// frames; otherwise it sends every received universe in full.
    pub fn change_to_receive_mode(&mut self, change_only: bool) -> Result<()> {
        self.connection
            .send(Label::ChangeReceiveMode.as_u8(), &[u8::from(change_only)])
    }

    /// Register the callback fired after each DMX update is applied.
    pub fn set_dmx_callback(&mut self, callback: impl FnMut() + 'static) {
        *self.input.on_dmx.borrow_mut() = Some(Box::new(callback));
    }

    /// Register the callback fired once when the widget goes away.
    pub fn set_on_remove(&mut self, callback: impl FnOnce() + 'static) {
        self.connection.set_on_remove(callback);
    }

    /// Snapshot of the received DMX universe.
    ///
    /// Remains valid after the connection has closed; it is the last state
    /// the widget reported.
    #[must_use]
    pub fn fetch_dmx(&self) -> DmxBuffer {
        self.input.dmx.borrow().clone()
    }

    /// Push bytes read from the channel into the widget.
    pub fn on_bytes_received(&mut self, bytes: &[u8]) {
        self.connection.on_bytes_received(bytes);
    }

    /// Signal that the channel closed.
    pub fn on_connection_closed(&mut self) {
        self.connection.on_connection_closed();
    }

    /// Borrow the underlying byte channel.
    pub fn transport(&self) -> &W {
        self.connection.transport()
    }

    /// Mutably borrow the underlying byte channel.
    pub fn transport_mut(&mut self) -> &mut W {
        self.connection.transport_mut()
    }
}

impl InputState {
    fn handle_frame(&self, frame: &Frame) {
        match frame.label_kind() {
            Some(Label::ReceiveDmx) => self.handle_dmx(frame.payload()),
            Some(Label::ChangeOfState) => self.handle_dmx_diff(frame.payload()),
            _ => debug!(label = frame.label(), "ignoring unsolicited frame"),
        }
    }

    /// Apply a full-universe frame: `{error_flag, start_code, channels...}`.
    fn handle_dmx(&self, payload: &[u8]) {
        if payload.len() < 2 {
            debug!(len = payload.len(), "truncated DMX frame");
            return;
        }
        if payload[0] != 0 {
            // Receive error on the wire, not a universe update.
            trace!(status = payload[0], "DMX frame with error flag set");
            return;
        }
        if payload[1] != DMX_NULL_START_CODE {
            trace!(start_code = payload[1], "ignoring non-null start code");
            return;
        }

        self.dmx.borrow_mut().set_range(0, &payload[2..]);
        self.notify_dmx();
    }

    /// Apply a change-of-state frame.
    ///
    /// Layout: one page byte, then a 40-bit presence bitmask, then one
    /// literal value per set bit in ascending bit order. Bit `i` of the mask
    /// addresses slot `page * 8 + i`; slot 0 is the start code and consumes
    /// no literal. The literal cursor advances independently of the bit
    /// index, by the popcount of the mask bytes consumed so far.
    fn handle_dmx_diff(&self, payload: &[u8]) {
        if payload.len() < COS_DATA_OFFSET {
            debug!(len = payload.len(), "truncated change of state frame");
            return;
        }
        let page = usize::from(payload[0]);
        let changed = &payload[1..COS_DATA_OFFSET];
        let mut offset = COS_DATA_OFFSET;

        {
            let mut dmx = self.dmx.borrow_mut();
            for bit in 0..COS_BITMASK_BYTES * 8 {
                let slot = page * 8 + bit;
                if slot > DMX_UNIVERSE_SIZE || offset >= payload.len() {
                    break;
                }
                if changed[bit / 8] & (1 << (bit % 8)) != 0 && slot != 0 {
                    dmx.set_channel(slot - 1, payload[offset]);
                    offset += 1;
                }
            }
        }
        self.notify_dmx();
    }

    /// Fire the DMX-update callback.
    ///
    /// The buffer borrow is released first, so the callback may call
    /// [`EnttecUsbProWidget::fetch_dmx`]. It must not replace itself.
    fn notify_dmx(&self) {
        if let Some(callback) = self.on_dmx.borrow_mut().as_mut() {
            callback();
        }
    }
}
