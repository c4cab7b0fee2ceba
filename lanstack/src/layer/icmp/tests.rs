use crate::config::Config;
use crate::layer::test_util::*;
use crate::time::Duration;
use crate::wire::{icmpv4, IpProtocol};

fn reply_from_peer(ident: u16, seq_no: u16, data: &[u8]) -> Vec<u8> {
    let repr = icmpv4::Repr::EchoReply { ident, seq_no, data };
    let mut bytes = vec![0; repr.buffer_len()];
    repr.emit(icmpv4::icmpv4::new_unchecked_mut(&mut bytes));
    ipv4_frame(IpProtocol::Icmp, &bytes)
}

#[test]
fn answer_echo_request() {
    let mut stack = stack_knowing_peer();
    let request = echo_request(0x1234, 7, b"abcdefgh");

    let sent = exchange(&mut stack, ipv4_frame(IpProtocol::Icmp, &request));
    assert_eq!(sent.len(), 1);

    let (eth, ip, payload) = parse_ipv4(&sent[0]);
    assert_eq!(eth.src_addr, HOST_MAC);
    assert_eq!(eth.dst_addr, PEER_MAC);
    assert_eq!(ip.src_addr, HOST_IP);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(ip.protocol, IpProtocol::Icmp);
    assert_eq!(ip.hop_limit, 64);

    let packet = icmpv4::icmpv4::new_checked(payload).unwrap();
    assert!(packet.verify_checksum());
    assert_eq!(icmpv4::Repr::parse(packet), Ok(icmpv4::Repr::EchoReply {
        ident: 0x1234,
        seq_no: 7,
        data: b"abcdefgh",
    }));
}

#[test]
fn echo_disabled() {
    let config = Config {
        answer_echo: false,
        ..Config::default()
    };
    let mut stack = stack_with(&config);
    let now = stack.now();
    stack.arp_mut().insert(PEER_IP, PEER_MAC, now).unwrap();

    let request = echo_request(1, 1, b"quiet");
    assert!(exchange(&mut stack, ipv4_frame(IpProtocol::Icmp, &request)).is_empty());
}

#[test]
fn bad_checksum_ignored() {
    let mut stack = stack_knowing_peer();
    let mut request = echo_request(1, 1, b"noise");
    request[2] ^= 0x01;
    assert!(exchange(&mut stack, ipv4_frame(IpProtocol::Icmp, &request)).is_empty());
}

#[test]
fn unknown_message_ignored() {
    let mut stack = stack_knowing_peer();
    let mut message = echo_request(1, 1, b"");
    {
        let packet = icmpv4::icmpv4::new_unchecked_mut(&mut message);
        packet.set_msg_type(icmpv4::Message::TimeExceeded);
        packet.fill_checksum();
    }
    assert!(exchange(&mut stack, ipv4_frame(IpProtocol::Icmp, &message)).is_empty());
}

#[test]
fn ping_and_reply() {
    let mut stack = stack_knowing_peer();
    assert_eq!(stack.ping(PEER_IP, 0x0101, 3, b"are you there"), Ok(()));

    let sent = stack.device_mut().take_sent();
    assert_eq!(sent.len(), 1);
    let (_, ip, payload) = parse_ipv4(&sent[0]);
    assert_eq!(ip.dst_addr, PEER_IP);
    let packet = icmpv4::icmpv4::new_checked(payload).unwrap();
    assert_eq!(icmpv4::Repr::parse(packet), Ok(icmpv4::Repr::EchoRequest {
        ident: 0x0101,
        seq_no: 3,
        data: b"are you there",
    }));

    stack.device_mut().advance(Duration::from_millis(12));
    assert!(exchange(&mut stack, reply_from_peer(0x0101, 3, b"are you there")).is_empty());

    let reply = stack.icmp_mut().take_reply().unwrap();
    assert_eq!(reply.src_addr, PEER_IP);
    assert_eq!(reply.ident, 0x0101);
    assert_eq!(reply.seq_no, 3);
    assert_eq!(reply.len, 13);
    assert_eq!(reply.timestamp, at(12));
    assert_eq!(stack.icmp_mut().take_reply(), None);
}
