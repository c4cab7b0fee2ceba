//! Encapsulates a network interface card.
//!
//! Also permits software emulation or implementation of one as well, of course. The stack only
//! ever asks a device for three things: transmit one frame, try to receive one frame without
//! blocking, and tell the current time.
mod external;
mod loopback;

#[cfg(all(feature = "std", target_os = "linux"))]
#[path="sys/mod.rs"]
mod sys_internal;

use crate::layer::Result;
use crate::time::Instant;

pub use self::external::External;
pub use self::loopback::Loopback;

#[cfg(all(feature = "std", target_os = "linux"))]
pub use self::sys_internal::exports as sys;

/// A link driver that moves whole Ethernet frames.
pub trait Device {
    /// Transmit one complete frame.
    ///
    /// The frame starts with the Ethernet header and is already padded to the minimum size.
    fn send(&mut self, frame: &[u8]) -> Result<()>;

    /// Try to receive one frame into `buffer` without blocking.
    ///
    /// Returns `Ok(None)` when no frame is ready, which is the normal idle outcome. A frame longer
    /// than the buffer is truncated to its length.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>>;

    /// The current time, as the clock of all protocol timers.
    fn timestamp(&self) -> Instant;
}

impl<D: Device + ?Sized> Device for &'_ mut D {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send(frame)
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        (**self).recv(buffer)
    }

    fn timestamp(&self) -> Instant {
        (**self).timestamp()
    }
}

/// Copy a queued frame into a receive buffer, truncating if necessary.
fn deliver(frame: &[u8], buffer: &mut [u8]) -> usize {
    let len = frame.len().min(buffer.len());
    buffer[..len].copy_from_slice(&frame[..len]);
    len
}
