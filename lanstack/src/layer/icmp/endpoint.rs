use crate::layer::{ip, Result};
use crate::nic::Device;
use crate::storage::PacketBuffer;
use crate::time::Instant;
use crate::wire::{icmpv4, IpProtocol, Ipv4Address};

/// The local state of the ICMP layer.
#[derive(Clone, Debug)]
pub struct Endpoint {
    /// Whether echo requests are answered.
    answer_echo: bool,

    /// The latest echo reply addressed to us.
    last_reply: Option<EchoReply>,
}

/// An echo reply to one of our requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EchoReply {
    /// The host that answered.
    pub src_addr: Ipv4Address,
    /// The identifier of the request.
    pub ident: u16,
    /// The sequence number of the request.
    pub seq_no: u16,
    /// Length of the echoed data.
    pub len: usize,
    /// When the reply arrived.
    pub timestamp: Instant,
}

impl Endpoint {
    /// Create an endpoint, answering echo requests or not.
    pub fn new(answer_echo: bool) -> Self {
        Endpoint {
            answer_echo,
            last_reply: None,
        }
    }

    /// Take the latest echo reply received since the last call.
    pub fn take_reply(&mut self) -> Option<EchoReply> {
        self.last_reply.take()
    }

    /// Process a received message.
    ///
    /// The window of `buffer` holds the message. An echo request is turned into its reply in place
    /// and sent back to `src_addr`.
    pub fn receive<D: Device>(
        &mut self,
        ip: &mut ip::Controller<D>,
        buffer: &mut PacketBuffer,
        src_addr: Ipv4Address,
    ) -> Result<()> {
        let repr = match icmpv4::icmpv4::new_checked(buffer.as_slice())
            .and_then(icmpv4::Repr::parse)
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("icmp: dropped message from {}: {}", src_addr, err);
                return Ok(());
            },
        };

        net_trace!("icmp: received {} from {}", repr, src_addr);
        match repr {
            icmpv4::Repr::EchoRequest { .. } if self.answer_echo => (),
            icmpv4::Repr::EchoReply { ident, seq_no, data } => {
                self.last_reply = Some(EchoReply {
                    src_addr,
                    ident,
                    seq_no,
                    len: data.len(),
                    timestamp: ip.timestamp(),
                });
                return Ok(());
            },
            _ => return Ok(()),
        }

        // Identifier, sequence number and data stay as they are.
        let packet = icmpv4::icmpv4::new_unchecked_mut(buffer.as_mut_slice());
        packet.set_msg_type(icmpv4::Message::EchoReply);
        packet.fill_checksum();

        ip.send(buffer, src_addr, IpProtocol::Icmp)
    }
}

/// Send an echo request.
pub fn ping<D: Device>(
    ip: &mut ip::Controller<D>,
    dst_addr: Ipv4Address,
    ident: u16,
    seq_no: u16,
    data: &[u8],
) -> Result<()> {
    let repr = icmpv4::Repr::EchoRequest { ident, seq_no, data };
    send(ip, repr, dst_addr)
}

/// Tell `dst_addr` that its datagram could not be delivered.
///
/// The `datagram` starts with its original IP header of `header_len` bytes. The message quotes
/// that header and at most eight bytes of the payload.
pub fn unreachable<D: Device>(
    ip: &mut ip::Controller<D>,
    datagram: &[u8],
    header_len: usize,
    dst_addr: Ipv4Address,
    reason: icmpv4::DstUnreachable,
) -> Result<()> {
    let quoted = (header_len + icmpv4::QUOTED_PAYLOAD_LEN).min(datagram.len());
    let repr = icmpv4::Repr::DstUnreachable {
        reason,
        data: &datagram[..quoted],
    };

    net_debug!("icmp: {} to {}", reason, dst_addr);
    send(ip, repr, dst_addr)
}

fn send<D: Device>(ip: &mut ip::Controller<D>, repr: icmpv4::Repr, dst_addr: Ipv4Address)
    -> Result<()>
{
    let mut buffer = PacketBuffer::new(repr.buffer_len());
    repr.emit(icmpv4::icmpv4::new_unchecked_mut(buffer.as_mut_slice()));
    ip.send(&mut buffer, dst_addr, IpProtocol::Icmp)
}
