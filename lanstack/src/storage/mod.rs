//! Packet storage.
//!
//! Every packet that moves through the stack lives in a [`PacketBuffer`]: an owned, fixed size
//! region of bytes and a data window into it. Layers push their header in front of the window on
//! the way down and pop it on the way up, the payload itself is never moved.
//!
//! [`PacketBuffer`]: struct.PacketBuffer.html
use core::fmt;

mod buffer;

pub use self::buffer::{PacketBuffer, HEADER_ROOM};

/// Errors of window manipulation on a [`PacketBuffer`].
///
/// [`PacketBuffer`]: struct.PacketBuffer.html
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The requested window does not fit the backing capacity.
    CapacityExceeded,

    /// Less space in front of the window than the header needs.
    InsufficientHeaderRoom,

    /// Tried to remove more bytes than the window holds.
    WindowTooShort,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "buffer capacity exceeded"),
            Error::InsufficientHeaderRoom => write!(f, "insufficient header room"),
            Error::WindowTooShort => write!(f, "window shorter than requested removal"),
        }
    }
}
