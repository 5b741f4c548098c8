//! Widget message labels.

use std::fmt;

/// Labels used by the Enttec USB Pro protocol.
///
/// The label is an opaque one-byte tag on the wire; this is the closed set of
/// values the widget layer understands. The codec never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Label {
    /// Request / response carrying the widget parameters
    GetParameters = 3,
    /// Update the widget parameters (no response)
    SetParameters = 4,
    /// Unsolicited full DMX universe from the widget
    ReceiveDmx = 5,
    /// Switch between "always send" and "send on change" receive modes
    ChangeReceiveMode = 8,
    /// Unsolicited delta DMX update (changed channels only)
    ChangeOfState = 9,
}

impl Label {
    /// Convert from byte.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            3 => Some(Self::GetParameters),
            4 => Some(Self::SetParameters),
            5 => Some(Self::ReceiveDmx),
            8 => Some(Self::ChangeReceiveMode),
            9 => Some(Self::ChangeOfState),
            _ => None,
        }
    }

    /// Convert to byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GetParameters => "GetParameters",
            Self::SetParameters => "SetParameters",
            Self::ReceiveDmx => "ReceiveDmx",
            Self::ChangeReceiveMode => "ChangeReceiveMode",
            Self::ChangeOfState => "ChangeOfState",
        };
        write!(f, "{name}")
    }
}
