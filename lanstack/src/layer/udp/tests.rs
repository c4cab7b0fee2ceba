use crate::layer::test_util::*;
use crate::layer::{udp as udp_layer, Error, FnHandler};
use crate::wire::{icmpv4, ipv4, udp, IpProtocol};

#[test]
fn closed_port_unreachable() {
    let mut stack = stack_knowing_peer();
    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 9, b"discard me");
    let original = ipv4_datagram(PEER_IP, HOST_IP, IpProtocol::Udp, &datagram);

    let sent = exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));
    assert_eq!(sent.len(), 1);

    let (eth, ip, payload) = parse_ipv4(&sent[0]);
    assert_eq!(eth.dst_addr, PEER_MAC);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(ip.protocol, IpProtocol::Icmp);

    let packet = icmpv4::icmpv4::new_checked(payload).unwrap();
    let repr = icmpv4::Repr::parse(packet).unwrap();
    let quoted = match repr {
        icmpv4::Repr::DstUnreachable { reason: icmpv4::DstUnreachable::PortUnreachable, data } => data,
        other => panic!("unexpected message {:?}", other),
    };

    assert_eq!(quoted.len(), ipv4::HEADER_LEN + icmpv4::QUOTED_PAYLOAD_LEN);
    assert_eq!(&quoted[..ipv4::HEADER_LEN], &original[..ipv4::HEADER_LEN]);
    // The quoted payload is the UDP header.
    assert_eq!(&quoted[ipv4::HEADER_LEN..], &datagram[..udp::HEADER_LEN]);
}

#[test]
fn deliver_to_handler() {
    let mut stack = stack();
    let inbox = Inbox::default();
    assert_eq!(stack.udp_open(7000, inbox.clone()), Ok(()));
    assert!(stack.udp().is_open(7000));

    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7000, b"hello");
    assert!(exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram)).is_empty());

    assert_eq!(inbox.take(), vec![Delivered {
        src_addr: PEER_IP,
        src_port: 5000,
        dst_port: 7000,
        payload: b"hello".to_vec(),
    }]);
}

#[test]
fn handler_answers() {
    let mut stack = stack_knowing_peer();
    let echo = FnHandler(|packet: udp_layer::Packet<'_>, sender: &mut dyn udp_layer::Sender| {
        sender.send_to(packet.payload, packet.dst_port, packet.src_addr, packet.src_port)
            .unwrap();
    });
    assert_eq!(stack.udp_open(7, echo), Ok(()));

    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7, b"echo this");
    let sent = exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));
    assert_eq!(sent.len(), 1);

    let (eth, ip, payload) = parse_ipv4(&sent[0]);
    assert_eq!(eth.dst_addr, PEER_MAC);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(ip.protocol, IpProtocol::Udp);

    let packet = udp::udp::new_checked(payload).unwrap();
    let repr = udp::Repr::parse(packet, HOST_IP, PEER_IP).unwrap();
    assert_eq!(repr.src_port, 7);
    assert_eq!(repr.dst_port, 5000);
    assert_eq!(packet.payload_slice(), b"echo this");
}

#[test]
fn zero_checksum_accepted() {
    let mut stack = stack();
    let inbox = Inbox::default();
    stack.udp_open(7000, inbox.clone()).unwrap();

    let mut datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7000, b"unchecked");
    datagram[6] = 0;
    datagram[7] = 0;
    exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));

    let delivered = inbox.take();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].payload, b"unchecked");
}

#[test]
fn bad_checksum_dropped() {
    let mut stack = stack_knowing_peer();
    let inbox = Inbox::default();
    stack.udp_open(7000, inbox.clone()).unwrap();

    let mut datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7000, b"corrupt");
    datagram[udp::HEADER_LEN] ^= 0x20;
    assert!(exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram)).is_empty());
    assert!(inbox.take().is_empty());
}

#[test]
fn close_port() {
    let mut stack = stack_knowing_peer();
    let inbox = Inbox::default();
    stack.udp_open(7000, inbox.clone()).unwrap();
    assert!(stack.udp_close(7000));
    assert!(!stack.udp_close(7000));
    assert!(!stack.udp().is_open(7000));

    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7000, b"too late");
    let sent = exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));
    assert_eq!(sent.len(), 1);
    assert!(inbox.take().is_empty());
}

#[test]
fn reopen_replaces_handler() {
    let mut stack = stack();
    let first = Inbox::default();
    let second = Inbox::default();
    stack.udp_open(7000, first.clone()).unwrap();
    stack.udp_open(7000, second.clone()).unwrap();

    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 7000, b"latest");
    exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));
    assert!(first.take().is_empty());
    assert_eq!(second.take().len(), 1);
}

#[test]
fn send_datagram() {
    let mut stack = stack_knowing_peer();
    assert_eq!(stack.udp_send(b"outgoing", 4000, PEER_IP, 53), Ok(()));

    let sent = stack.device_mut().take_sent();
    assert_eq!(sent.len(), 1);
    let (_, ip, payload) = parse_ipv4(&sent[0]);
    assert_eq!(ip.src_addr, HOST_IP);
    let packet = udp::udp::new_checked(payload).unwrap();
    assert!(packet.verify_checksum(HOST_IP, PEER_IP));
    assert_eq!(udp::Repr::parse(packet, HOST_IP, PEER_IP), Ok(udp::Repr {
        src_port: 4000,
        dst_port: 53,
        length: 16,
    }));
}

#[test]
fn registry_exhausted() {
    let config = crate::Config {
        map_budget: 256,
        ..crate::Config::default()
    };
    let mut stack = stack_with(&config);

    let mut opened = 0u16;
    let err = loop {
        match stack.udp_open(1000 + opened, Inbox::default()) {
            Ok(()) => {
                opened += 1;
                assert!(opened < 100, "registry never filled");
            },
            Err(err) => break err,
        }
    };

    assert_eq!(err, Error::Exhausted);
    assert!(opened > 0);
    assert!(!stack.udp().is_open(1000 + opened));
    assert!((1000..1000 + opened).all(|port| stack.udp().is_open(port)));

    // Replacing a registered handler needs no new slot.
    let inbox = Inbox::default();
    assert_eq!(stack.udp_open(1000, inbox.clone()), Ok(()));
    let datagram = udp_datagram(PEER_IP, HOST_IP, 5000, 1000, b"still served");
    exchange(&mut stack, ipv4_frame(IpProtocol::Udp, &datagram));
    assert_eq!(inbox.take().len(), 1);

    // Closing frees a slot.
    assert!(stack.udp_close(1001));
    assert_eq!(stack.udp_open(1000 + opened, Inbox::default()), Ok(()));
}
