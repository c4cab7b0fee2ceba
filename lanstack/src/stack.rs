//! The stack context.
//!
//! A [`Stack`] owns a device and the state of every layer. It is driven by calling [`poll`]
//! repeatedly, each call performing at most one non-blocking receive and processing the frame, and
//! any answers it causes, to completion.
//!
//! Dispatch between the layers is a plain `match` on the Ethernet type and IP protocol fields,
//! the set of protocols is fixed.
//!
//! [`Stack`]: struct.Stack.html
//! [`poll`]: struct.Stack.html#method.poll
use crate::config::Config;
use crate::layer::{arp, eth, icmp, ip, udp, Error, Result};
use crate::nic::Device;
use crate::storage::{PacketBuffer, HEADER_ROOM};
use crate::time::Instant;
use crate::wire::{ethernet, EthernetProtocol, IpProtocol, Ipv4Address};

/// A complete host on one Ethernet link.
pub struct Stack<D> {
    device: D,
    eth: eth::Endpoint,
    arp: arp::Endpoint,
    ip: ip::Endpoint,
    icmp: icmp::Endpoint,
    udp: udp::Endpoint,

    /// Reused for every received frame.
    rx: PacketBuffer,

    /// The largest frame we accept, header included.
    frame_len: usize,
}

impl<D: Device> Stack<D> {
    /// Create a stack on `device` with the addresses and limits of `config`.
    pub fn new(device: D, config: &Config) -> Self {
        let frame_len = ethernet::HEADER_LEN + config.effective_mtu();
        Stack {
            device,
            eth: eth::Endpoint::new(config.mac_addr),
            arp: arp::Endpoint::new(config),
            ip: ip::Endpoint::new(config),
            icmp: icmp::Endpoint::new(config.answer_echo),
            udp: udp::Endpoint::new(config.map_budget),
            rx: PacketBuffer::with_capacity(HEADER_ROOM + frame_len + ethernet::MIN_PAYLOAD_LEN),
            frame_len,
        }
    }

    /// Try to receive and process one frame.
    ///
    /// Returns whether a frame was received. Only errors of the device are returned, a frame that
    /// can not be processed is dropped.
    pub fn poll(&mut self) -> Result<bool> {
        self.rx.init(self.frame_len)?;
        let len = match self.device.recv(self.rx.as_mut_slice())? {
            Some(len) => len.min(self.frame_len),
            None => return Ok(false),
        };
        self.rx.remove_padding(self.frame_len - len)?;

        match self.process() {
            Err(Error::Device) => Err(Error::Device),
            Err(err) => {
                net_debug!("stack: dropped frame: {}", err);
                Ok(true)
            },
            Ok(()) => Ok(true),
        }
    }

    /// Broadcast a gratuitous ARP request for our own address.
    pub fn announce(&mut self) -> Result<()> {
        let mut eth = self.eth.controller(&mut self.device);
        self.arp.announce(&mut eth)
    }

    /// Send the window of `buffer` as IP payload.
    pub fn send_ip(&mut self, buffer: &mut PacketBuffer, dst_addr: Ipv4Address, protocol: IpProtocol)
        -> Result<()>
    {
        self.ip_controller().send(buffer, dst_addr, protocol)
    }

    /// Register the handler of a local UDP port.
    pub fn udp_open(&mut self, port: u16, handler: impl udp::Recv + 'static) -> Result<()> {
        self.udp.open(port, handler)
    }

    /// Remove the handler of a local UDP port.
    pub fn udp_close(&mut self, port: u16) -> bool {
        self.udp.close(port)
    }

    /// Send one UDP datagram.
    pub fn udp_send(&mut self, payload: &[u8], src_port: u16, dst_addr: Ipv4Address, dst_port: u16)
        -> Result<()>
    {
        udp::send(&mut self.ip_controller(), payload, src_port, dst_addr, dst_port)
    }

    /// Send an ICMP echo request.
    pub fn ping(&mut self, dst_addr: Ipv4Address, ident: u16, seq_no: u16, data: &[u8]) -> Result<()> {
        icmp::ping(&mut self.ip_controller(), dst_addr, ident, seq_no, data)
    }

    /// The current time of the device.
    pub fn now(&self) -> Instant {
        self.device.timestamp()
    }

    /// The device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The ARP tables.
    pub fn arp(&self) -> &arp::Endpoint {
        &self.arp
    }

    /// The ARP tables, mutably.
    pub fn arp_mut(&mut self) -> &mut arp::Endpoint {
        &mut self.arp
    }

    /// The IP endpoint.
    pub fn ip(&self) -> &ip::Endpoint {
        &self.ip
    }

    /// The ICMP endpoint.
    pub fn icmp_mut(&mut self) -> &mut icmp::Endpoint {
        &mut self.icmp
    }

    /// The UDP port registry.
    pub fn udp(&self) -> &udp::Endpoint {
        &self.udp
    }

    fn ip_controller(&mut self) -> ip::Controller<'_, D> {
        ip::Controller::new(
            &mut self.ip,
            &mut self.arp,
            self.eth.controller(&mut self.device))
    }

    fn process(&mut self) -> Result<()> {
        let Stack { device, eth, arp, ip, icmp, udp, rx, .. } = self;

        let repr = match eth.receive(rx) {
            Some(repr) => repr,
            None => return Ok(()),
        };

        let mut eth = eth.controller(device);
        match repr.ethertype {
            EthernetProtocol::Arp => arp.receive(&mut eth, rx.as_slice()),
            EthernetProtocol::Ipv4 => {
                let mut ip = ip::Controller::new(ip, arp, eth);
                let received = match ip.receive(rx)? {
                    Some(received) => received,
                    None => return Ok(()),
                };

                match received.repr.protocol {
                    IpProtocol::Icmp => icmp.receive(&mut ip, rx, received.repr.src_addr),
                    IpProtocol::Udp => udp.receive(&mut ip, rx, &received),
                    _ => Ok(()),
                }
            },
            other => {
                net_trace!("stack: no handler for ethertype {}", other);
                Ok(())
            },
        }
    }
}
