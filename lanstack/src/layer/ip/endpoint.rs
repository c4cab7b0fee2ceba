use crate::config::Config;
use crate::layer::{arp, eth, icmp, Error, Result};
use crate::nic::Device;
use crate::storage::PacketBuffer;
use crate::time::Instant;
use crate::wire::{icmpv4, ipv4, IpProtocol, Ipv4Address};

/// The local state of the IPv4 layer.
#[derive(Clone, Debug)]
pub struct Endpoint {
    /// Our own address.
    ///
    /// We ignore any packets with mismatching destination.
    addr: Ipv4Address,

    /// The largest datagram we send, header included.
    mtu: usize,

    /// The time to live of sent datagrams.
    hop_limit: u8,

    /// The identification of the next datagram.
    next_ident: u16,
}

/// A validated datagram whose header was removed from the buffer window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Received {
    /// The parsed header.
    pub repr: ipv4::Repr,
    /// The length of the header including options.
    ///
    /// Adding a header of this length to the buffer restores the original datagram.
    pub header_len: usize,
}

/// The IPv4 endpoint borrowed together with all layers below it.
pub struct Controller<'a, D> {
    ip: &'a mut Endpoint,
    arp: &'a mut arp::Endpoint,
    eth: eth::Controller<'a, D>,
}

impl Endpoint {
    /// Create an endpoint with address, MTU and hop limit of `config`.
    pub fn new(config: &Config) -> Self {
        Endpoint {
            addr: config.ip_addr,
            mtu: config.effective_mtu(),
            hop_limit: config.hop_limit,
            next_ident: 0,
        }
    }

    /// The local address.
    pub fn addr(&self) -> Ipv4Address {
        self.addr
    }

    /// The MTU, header included.
    pub fn mtu(&self) -> usize {
        self.mtu
    }

    /// Draw the identification for a new datagram.
    fn next_ident(&mut self) -> u16 {
        let ident = self.next_ident;
        self.next_ident = ident.wrapping_add(1);
        ident
    }

    /// The largest payload of a single fragment, a multiple of eight.
    fn fragment_len(&self) -> usize {
        (self.mtu - ipv4::HEADER_LEN) / 8 * 8
    }
}

impl<'a, D: Device> Controller<'a, D> {
    /// Combine the layer endpoints for one operation.
    pub fn new(ip: &'a mut Endpoint, arp: &'a mut arp::Endpoint, eth: eth::Controller<'a, D>) -> Self {
        Controller {
            ip,
            arp,
            eth,
        }
    }

    /// The local address.
    pub fn src_addr(&self) -> Ipv4Address {
        self.ip.addr
    }

    /// The current time of the device.
    pub fn timestamp(&self) -> Instant {
        self.eth.timestamp()
    }

    /// Validate a received datagram and strip its header.
    ///
    /// Returns `Ok(None)` when the datagram was consumed here. That is the case for every invalid
    /// datagram, for datagrams addressed to other hosts, and for protocols without a handler,
    /// which are answered with an ICMP protocol unreachable message.
    pub fn receive(&mut self, buffer: &mut PacketBuffer) -> Result<Option<Received>> {
        let (repr, header_len) = match ipv4::ipv4::new_checked(buffer.as_slice()) {
            Ok(packet) => match ipv4::Repr::parse(packet) {
                Ok(repr) => (repr, usize::from(packet.header_len())),
                Err(err) => {
                    net_trace!("ip: dropped datagram: {}", err);
                    return Ok(None);
                },
            },
            Err(err) => {
                net_trace!("ip: dropped datagram: {}", err);
                return Ok(None);
            },
        };

        if repr.dst_addr != self.ip.addr {
            net_trace!("ip: dropped datagram for {}", repr.dst_addr);
            return Ok(None);
        }

        net_trace!("ip: received {}", repr);
        let total_len = header_len + repr.payload_len;
        if buffer.len() > total_len {
            buffer.remove_padding(buffer.len() - total_len)?;
        }

        match repr.protocol {
            IpProtocol::Icmp | IpProtocol::Udp => (),
            other => {
                net_debug!("ip: no handler for protocol {}", other);
                icmp::unreachable(
                    self,
                    buffer.as_slice(),
                    header_len,
                    repr.src_addr,
                    icmpv4::DstUnreachable::ProtoUnreachable)?;
                return Ok(None);
            },
        }

        buffer.remove_header(header_len)?;
        Ok(Some(Received { repr, header_len }))
    }

    /// Send the window of `buffer` as the payload of one datagram.
    ///
    /// Payloads larger than the MTU allows are split into fragments sharing one identification.
    /// Each fragment but the last carries a multiple of eight bytes and has the more fragments
    /// flag set. An empty payload is sent as a bare header.
    pub fn send(&mut self, buffer: &mut PacketBuffer, dst_addr: Ipv4Address, protocol: IpProtocol)
        -> Result<()>
    {
        let payload_len = buffer.len();
        if payload_len > ipv4::MAX_TOTAL_LEN - ipv4::HEADER_LEN {
            return Err(Error::BadSize);
        }

        let ident = self.ip.next_ident();
        if payload_len <= self.ip.mtu - ipv4::HEADER_LEN {
            return self.send_fragment(buffer, dst_addr, protocol, ident, 0, false);
        }

        let chunk = self.ip.fragment_len();
        net_debug!("ip: fragmenting {} bytes into chunks of {}", payload_len, chunk);

        let mut offset = 0;
        while offset < payload_len {
            let end = (offset + chunk).min(payload_len);
            let more_frags = end < payload_len;
            let mut fragment = PacketBuffer::from_slice(&buffer.as_slice()[offset..end]);
            self.send_fragment(&mut fragment, dst_addr, protocol, ident, (offset / 8) as u16, more_frags)?;
            offset = end;
        }

        Ok(())
    }

    /// Push a header in front of the window and pass the datagram on for address resolution.
    ///
    /// The `frag_offset` is in units of eight bytes.
    pub fn send_fragment(
        &mut self,
        buffer: &mut PacketBuffer,
        dst_addr: Ipv4Address,
        protocol: IpProtocol,
        ident: u16,
        frag_offset: u16,
        more_frags: bool,
    ) -> Result<()> {
        let repr = ipv4::Repr {
            src_addr: self.ip.addr,
            dst_addr,
            protocol,
            payload_len: buffer.len(),
            hop_limit: self.ip.hop_limit,
            ident,
            more_frags,
            frag_offset,
        };

        buffer.add_header(repr.buffer_len())?;
        repr.emit(ipv4::ipv4::new_unchecked_mut(buffer.as_mut_slice()));

        net_trace!("ip: sending {}", repr);
        self.arp.send(&mut self.eth, buffer, dst_addr)
    }
}
