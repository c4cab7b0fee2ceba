//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol layer is split into two parts; the packet logic contained in `wire` and the
//! processing part in this module. An endpoint represents the local state of a protocol, for
//! example the neighbor table of ARP or the registered ports of UDP. This state is open to
//! modification by the user program while no processing takes place, similar to reconfiguration
//! on the OS level with utilities such as `arp` or `ip addr`.
//!
//! ## Receiving
//!
//! A received frame is handed upwards in a single [`PacketBuffer`]. Every layer validates its own
//! header, drops the frame silently if anything is amiss, and otherwise removes the header from
//! the window before the next layer looks at it. The header bytes stay in place behind the window
//! so that an error message can still quote the original datagram.
//!
//! ## Sending
//!
//! Sending goes through controllers. A controller borrows the endpoints of its own layer and of all
//! layers below it, together with the device, for the duration of one operation. Each layer pushes
//! its header in front of the window and passes the buffer down, until the Ethernet controller
//! hands the complete frame to the device.
//!
//! [`PacketBuffer`]: ../storage/struct.PacketBuffer.html
use core::fmt;

pub mod arp;
pub mod eth;
pub mod icmp;
pub mod ip;
pub mod udp;

#[cfg(test)]
pub(crate) mod test_util;

/// The result type of layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors of sending and processing.
///
/// Dropping a malformed incoming packet is not an error. Layers only report conditions the caller
/// can react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when a packet could not be represented on the wire.
    Illegal,

    /// Not enough space for the requested packet.
    ///
    /// May also be returned when trying to resize a packet but the requested length can not be
    /// fulfilled.
    BadSize,

    /// Unable to find a route towards the destination address.
    Unreachable,

    /// The action could not be completed because there were not enough resources.
    ///
    /// The main difference towards `Illegal` is that implies that it would have been legal with
    /// more resources, for example after entries of a full table expired.
    Exhausted,

    /// The link driver failed.
    ///
    /// The concrete device usually keeps the underlying error around.
    Device,
}

/// A standard wrapper for a function implementing receive traits.
///
/// Keeps the type alias overhead low by providing a single wrapper type that implements the
/// handler traits for all layers, where applicable.
pub struct FnHandler<F>(pub F);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Illegal => write!(f, "illegal operation"),
            Error::BadSize => write!(f, "packet size out of bounds"),
            Error::Unreachable => write!(f, "destination unreachable"),
            Error::Exhausted => write!(f, "resources exhausted"),
            Error::Device => write!(f, "device error"),
        }
    }
}

/// Can convert from a wire error.
///
/// This indicates some layer tried to operate on a packet but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Illegal
    }
}

/// Can convert from a buffer error.
///
/// One common cause is failure to make room for another header.
impl From<crate::storage::Error> for Error {
    fn from(_: crate::storage::Error) -> Self {
        Error::BadSize
    }
}

impl From<crate::managed::Error> for Error {
    fn from(err: crate::managed::Error) -> Self {
        match err {
            crate::managed::Error::TableFull => Error::Exhausted,
        }
    }
}
