use alloc::boxed::Box;
use core::fmt;

use crate::layer::{icmp, ip, Error, Result};
use crate::managed::ExpiringMap;
use crate::nic::Device;
use crate::storage::PacketBuffer;
use crate::time::{Duration, Instant};
use crate::wire::{icmpv4, udp, IpProtocol, Ipv4Address};

use super::{Packet, Recv, Sender};

/// The port registry.
pub struct Endpoint {
    /// Handlers by local port. Entries never expire.
    ports: ExpiringMap<u16, Box<dyn Recv>>,
}

impl Endpoint {
    /// Create a registry whose table occupies at most `budget` bytes.
    pub fn new(budget: usize) -> Self {
        Endpoint {
            ports: ExpiringMap::with_budget(budget, Duration::from_secs(0)),
        }
    }

    /// Register the handler of `port`, replacing any previous one.
    pub fn open(&mut self, port: u16, handler: impl Recv + 'static) -> Result<()> {
        self.ports.set(port, Box::new(handler), Instant::default())?;
        Ok(())
    }

    /// Remove the handler of `port`, if any.
    pub fn close(&mut self, port: u16) -> bool {
        self.ports.remove(&port).is_some()
    }

    /// Check if a handler is registered for `port`.
    pub fn is_open(&self, port: u16) -> bool {
        self.ports.contains_key(&port, Instant::default())
    }

    /// Process a received datagram.
    ///
    /// The window of `buffer` holds the UDP header and payload, `received` describes the IP header
    /// in front of it.
    pub fn receive<D: Device>(
        &mut self,
        ip: &mut ip::Controller<D>,
        buffer: &mut PacketBuffer,
        received: &ip::Received,
    ) -> Result<()> {
        let src_addr = received.repr.src_addr;
        let repr = match udp::udp::new_checked(buffer.as_slice())
            .and_then(|packet| udp::Repr::parse(packet, src_addr, received.repr.dst_addr))
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("udp: dropped datagram from {}: {}", src_addr, err);
                return Ok(());
            },
        };

        net_trace!("udp: received {} from {}", repr, src_addr);
        let handler = match self.ports.get_mut(&repr.dst_port, Instant::default()) {
            Some(handler) => handler,
            None => {
                net_debug!("udp: port {} closed", repr.dst_port);
                buffer.add_header(received.header_len)?;
                return icmp::unreachable(
                    ip,
                    buffer.as_slice(),
                    received.header_len,
                    src_addr,
                    icmpv4::DstUnreachable::PortUnreachable);
            },
        };

        let payload = &buffer.as_slice()[udp::HEADER_LEN..repr.buffer_len()];
        handler.receive(Packet {
            src_addr,
            src_port: repr.src_port,
            dst_port: repr.dst_port,
            payload,
        }, ip);

        Ok(())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("capacity", &self.ports.capacity())
            .field("open", &self.ports.len(Instant::default()))
            .finish()
    }
}

/// Send `payload` in one datagram.
pub fn send<D: Device>(
    ip: &mut ip::Controller<D>,
    payload: &[u8],
    src_port: u16,
    dst_addr: Ipv4Address,
    dst_port: u16,
) -> Result<()> {
    let mut buffer = PacketBuffer::from_slice(payload);
    send_buffer(ip, &mut buffer, src_port, dst_addr, dst_port)
}

/// Push a header in front of the window of `buffer` and send it.
pub fn send_buffer<D: Device>(
    ip: &mut ip::Controller<D>,
    buffer: &mut PacketBuffer,
    src_port: u16,
    dst_addr: Ipv4Address,
    dst_port: u16,
) -> Result<()> {
    let length = udp::HEADER_LEN + buffer.len();
    if length > usize::from(u16::max_value()) {
        return Err(Error::BadSize);
    }

    let repr = udp::Repr {
        src_port,
        dst_port,
        length: length as u16,
    };

    buffer.add_header(udp::HEADER_LEN)?;
    repr.emit(udp::udp::new_unchecked_mut(buffer.as_mut_slice()), ip.src_addr(), dst_addr);
    ip.send(buffer, dst_addr, IpProtocol::Udp)
}

impl<D: Device> Sender for ip::Controller<'_, D> {
    fn send_to(&mut self, payload: &[u8], src_port: u16, dst_addr: Ipv4Address, dst_port: u16)
        -> Result<()>
    {
        send(self, payload, src_port, dst_addr, dst_port)
    }
}
