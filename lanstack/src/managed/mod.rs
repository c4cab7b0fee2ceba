//! Containers for protocol state.
//!
//! The stack keeps all of its tables in fixed capacity containers that are allocated once when
//! the stack is created. The only such container is the [`ExpiringMap`], used for the ARP
//! address table, the queue of packets waiting for address resolution and the UDP port registry.
//!
//! [`ExpiringMap`]: struct.ExpiringMap.html
use core::fmt;

mod expiring;

pub use self::expiring::{ExpiringMap, Iter};

/// Errors of the managed containers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// No free or expired slot was left for a new key.
    TableFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TableFull => write!(f, "table full"),
        }
    }
}
