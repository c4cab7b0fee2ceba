//! The UDP layer.
//!
//! Received datagrams are delivered to the handler registered for their destination port. A
//! datagram for a port without a handler is answered with an ICMP port unreachable message. There
//! is at most one handler per port and registering another one replaces it.
use crate::wire::Ipv4Address;

mod endpoint;
#[cfg(test)]
mod tests;

pub use endpoint::{Endpoint, send, send_buffer};

/// A received datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packet<'a> {
    /// The address of the sender.
    pub src_addr: Ipv4Address,
    /// The port of the sender.
    pub src_port: u16,
    /// The local port the datagram was sent to.
    pub dst_port: u16,
    /// The payload, without header.
    pub payload: &'a [u8],
}

/// A UDP receiver.
///
/// Registered for a port, it sees all datagrams sent to it. The sender can answer immediately,
/// before the datagram is released.
pub trait Recv {
    /// Inspect one incoming datagram.
    fn receive(&mut self, packet: Packet<'_>, sender: &mut dyn Sender);
}

/// A UDP sender.
///
/// Handed to receivers for answering. Implemented by the IP controller.
pub trait Sender {
    /// Send `payload` in one datagram.
    fn send_to(&mut self, payload: &[u8], src_port: u16, dst_addr: Ipv4Address, dst_port: u16)
        -> crate::layer::Result<()>;
}

impl<F> Recv for crate::layer::FnHandler<F>
    where F: FnMut(Packet<'_>, &mut dyn Sender),
{
    fn receive(&mut self, packet: Packet<'_>, sender: &mut dyn Sender) {
        (self.0)(packet, sender)
    }
}
