//! Widget device parameters.

use crate::protocol::{Error, Label, Result};

/// Size of a GET_PARAMETERS response payload.
pub const PARAMETERS_PAYLOAD_SIZE: usize = 5;

/// Immutable snapshot of the widget's device parameters.
///
/// Byte layout matches the GET_PARAMETERS response: firmware low byte,
/// firmware high byte, break time, mark-after-break time, DMX refresh rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidgetParameters {
    /// Firmware version, low byte
    pub firmware: u8,
    /// Firmware version, high byte
    pub firmware_high: u8,
    /// DMX break time, in 10.67us units
    pub break_time: u8,
    /// Mark-after-break time, in 10.67us units
    pub mab_time: u8,
    /// DMX refresh rate, in packets per second
    pub rate: u8,
}

impl WidgetParameters {
    /// Decode parameters from a GET_PARAMETERS response payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() < PARAMETERS_PAYLOAD_SIZE {
            return Err(Error::ShortPayload {
                label: Label::GetParameters.as_u8(),
                needed: PARAMETERS_PAYLOAD_SIZE,
                got: payload.len(),
            });
        }
        Ok(Self {
            firmware: payload[0],
            firmware_high: payload[1],
            break_time: payload[2],
            mab_time: payload[3],
            rate: payload[4],
        })
    }

    /// Combined firmware version.
    #[must_use]
    pub fn firmware_version(&self) -> u16 {
        u16::from(self.firmware) | (u16::from(self.firmware_high) << 8)
    }
}
