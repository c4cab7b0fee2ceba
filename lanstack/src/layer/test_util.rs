//! Addresses and frame builders shared by the layer tests.
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::config::Config;
use crate::layer::udp as udp_layer;
use crate::nic::External;
use crate::stack::Stack;
use crate::time::Instant;
use crate::wire::{arp, ethernet, icmpv4, ipv4, udp};
use crate::wire::{EthernetAddress, EthernetProtocol, IpProtocol, Ipv4Address};

pub(crate) const HOST_MAC: EthernetAddress = EthernetAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
pub(crate) const HOST_IP: Ipv4Address = Ipv4Address::new(192, 168, 56, 2);
pub(crate) const PEER_MAC: EthernetAddress = EthernetAddress([0x0a, 0x00, 0x27, 0x00, 0x00, 0x01]);
pub(crate) const PEER_IP: Ipv4Address = Ipv4Address::new(192, 168, 56, 1);

/// A stack with the default configuration on a scripted device.
pub(crate) fn stack() -> Stack<External> {
    stack_with(&Config::default())
}

pub(crate) fn stack_with(config: &Config) -> Stack<External> {
    Stack::new(External::new(), config)
}

/// A stack that already knows the peer.
pub(crate) fn stack_knowing_peer() -> Stack<External> {
    let mut stack = stack();
    let now = stack.now();
    stack.arp_mut().insert(PEER_IP, PEER_MAC, now).unwrap();
    stack
}

/// Feed one frame to the stack and return everything it sent in response.
pub(crate) fn exchange(stack: &mut Stack<External>, frame: Vec<u8>) -> Vec<Vec<u8>> {
    stack.device_mut().push(frame);
    assert_eq!(stack.poll(), Ok(true));
    stack.device_mut().take_sent()
}

pub(crate) fn at(millis: i64) -> Instant {
    Instant::from_millis(millis)
}

pub(crate) fn eth_frame(
    src_addr: EthernetAddress,
    dst_addr: EthernetAddress,
    ethertype: EthernetProtocol,
    payload: &[u8],
) -> Vec<u8> {
    let mut bytes = vec![0; ethernet::HEADER_LEN + payload.len()];
    let frame = ethernet::ethernet::new_unchecked_mut(&mut bytes);
    ethernet::Repr { src_addr, dst_addr, ethertype }.emit(frame);
    frame.payload_mut_slice().copy_from_slice(payload);
    bytes
}

pub(crate) fn arp_frame(
    operation: arp::Operation,
    source: (EthernetAddress, Ipv4Address),
    target: (EthernetAddress, Ipv4Address),
    dst_addr: EthernetAddress,
) -> Vec<u8> {
    let repr = arp::Repr::EthernetIpv4 {
        operation,
        source_hardware_addr: source.0,
        source_protocol_addr: source.1,
        target_hardware_addr: target.0,
        target_protocol_addr: target.1,
    };
    let mut payload = vec![0; repr.buffer_len()];
    repr.emit(arp::arp::new_unchecked_mut(&mut payload));
    eth_frame(source.0, dst_addr, EthernetProtocol::Arp, &payload)
}

/// A complete, unfragmented IPv4 datagram.
pub(crate) fn ipv4_datagram(
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    protocol: IpProtocol,
    payload: &[u8],
) -> Vec<u8> {
    let repr = ipv4::Repr {
        src_addr,
        dst_addr,
        protocol,
        payload_len: payload.len(),
        hop_limit: 64,
        ident: 0x4242,
        more_frags: false,
        frag_offset: 0,
    };
    let mut bytes = vec![0; repr.buffer_len() + payload.len()];
    repr.emit(ipv4::ipv4::new_unchecked_mut(&mut bytes));
    bytes[ipv4::HEADER_LEN..].copy_from_slice(payload);
    bytes
}

/// An IPv4 datagram from the peer to the host, in a frame.
pub(crate) fn ipv4_frame(protocol: IpProtocol, payload: &[u8]) -> Vec<u8> {
    let datagram = ipv4_datagram(PEER_IP, HOST_IP, protocol, payload);
    eth_frame(PEER_MAC, HOST_MAC, EthernetProtocol::Ipv4, &datagram)
}

/// A UDP datagram with a valid checksum.
pub(crate) fn udp_datagram(
    src_addr: Ipv4Address,
    dst_addr: Ipv4Address,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let repr = udp::Repr {
        src_port,
        dst_port,
        length: (udp::HEADER_LEN + payload.len()) as u16,
    };
    let mut bytes = vec![0; repr.buffer_len()];
    bytes[udp::HEADER_LEN..].copy_from_slice(payload);
    repr.emit(udp::udp::new_unchecked_mut(&mut bytes), src_addr, dst_addr);
    bytes
}

pub(crate) fn echo_request(ident: u16, seq_no: u16, data: &[u8]) -> Vec<u8> {
    let repr = icmpv4::Repr::EchoRequest { ident, seq_no, data };
    let mut bytes = vec![0; repr.buffer_len()];
    repr.emit(icmpv4::icmpv4::new_unchecked_mut(&mut bytes));
    bytes
}

/// Split a sent frame into its Ethernet header and payload.
pub(crate) fn parse_eth(frame: &[u8]) -> (ethernet::Repr, &[u8]) {
    let frame = ethernet::ethernet::new_checked(frame).unwrap();
    (ethernet::Repr::parse(frame).unwrap(), frame.payload_slice())
}

/// Parse the IPv4 datagram of a sent frame, returning the header and the exact payload.
pub(crate) fn parse_ipv4(frame: &[u8]) -> (ethernet::Repr, ipv4::Repr, &[u8]) {
    let (eth, payload) = parse_eth(frame);
    assert_eq!(eth.ethertype, EthernetProtocol::Ipv4);
    let packet = ipv4::ipv4::new_checked(payload).unwrap();
    let repr = ipv4::Repr::parse(packet).unwrap();
    let end = ipv4::HEADER_LEN + repr.payload_len;
    (eth, repr, &payload[ipv4::HEADER_LEN..end])
}

pub(crate) fn parse_arp(frame: &[u8]) -> (ethernet::Repr, arp::Repr) {
    let (eth, payload) = parse_eth(frame);
    assert_eq!(eth.ethertype, EthernetProtocol::Arp);
    let packet = arp::arp::new_checked(payload).unwrap();
    (eth, arp::Repr::parse(packet).unwrap())
}

/// A UDP handler recording every datagram it receives.
#[derive(Clone, Debug, Default)]
pub(crate) struct Inbox(Rc<RefCell<Vec<Delivered>>>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Delivered {
    pub(crate) src_addr: Ipv4Address,
    pub(crate) src_port: u16,
    pub(crate) dst_port: u16,
    pub(crate) payload: Vec<u8>,
}

impl Inbox {
    pub(crate) fn take(&self) -> Vec<Delivered> {
        core::mem::replace(&mut *self.0.borrow_mut(), Vec::new())
    }
}

impl udp_layer::Recv for Inbox {
    fn receive(&mut self, packet: udp_layer::Packet<'_>, _: &mut dyn udp_layer::Sender) {
        self.0.borrow_mut().push(Delivered {
            src_addr: packet.src_addr,
            src_port: packet.src_port,
            dst_port: packet.dst_port,
            payload: packet.payload.to_vec(),
        });
    }
}
