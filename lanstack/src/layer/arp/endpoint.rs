use crate::config::Config;
use crate::layer::{eth, Error, Result};
use crate::managed::ExpiringMap;
use crate::nic::Device;
use crate::storage::PacketBuffer;
use crate::time::Instant;
use crate::wire::{arp, EthernetAddress, EthernetProtocol, Ipv4Address};

/// The neighbor cache and the resolution queue.
#[derive(Debug)]
pub struct Endpoint {
    /// Our own protocol address, the only one we answer for.
    addr: Ipv4Address,

    /// Learned mappings, expiring after the ARP timeout.
    neighbors: ExpiringMap<Ipv4Address, EthernetAddress>,

    /// One packet per address being resolved, expiring after the retry interval.
    pending: ExpiringMap<Ipv4Address, PacketBuffer>,

    /// Whether any valid packet updates the cache.
    learn_unsolicited: bool,
}

/// One entry of the neighbor cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighbor {
    /// The protocol address.
    pub protocol_addr: Ipv4Address,
    /// The hardware address it maps to.
    pub hardware_addr: EthernetAddress,
    /// When the mapping was last learned.
    pub stamp: Instant,
}

impl Endpoint {
    /// Create the tables for the local address of `config`.
    pub fn new(config: &Config) -> Self {
        Endpoint {
            addr: config.ip_addr,
            neighbors: ExpiringMap::with_budget(config.map_budget, config.arp_timeout),
            pending: ExpiringMap::with_budget(config.map_budget, config.arp_retry),
            learn_unsolicited: config.arp_learn_unsolicited,
        }
    }

    /// The local protocol address.
    pub fn addr(&self) -> Ipv4Address {
        self.addr
    }

    /// Find the hardware address of a neighbor.
    ///
    /// The limited broadcast address always maps to the Ethernet broadcast.
    pub fn lookup(&self, addr: Ipv4Address, now: Instant) -> Option<EthernetAddress> {
        if addr.is_broadcast() {
            return Some(EthernetAddress::BROADCAST);
        }

        self.neighbors.get(&addr, now).copied()
    }

    /// Add or refresh a mapping by hand.
    pub fn insert(&mut self, protocol_addr: Ipv4Address, hardware_addr: EthernetAddress, now: Instant)
        -> Result<()>
    {
        self.neighbors.set(protocol_addr, hardware_addr, now)?;
        Ok(())
    }

    /// Forget a mapping.
    pub fn remove(&mut self, protocol_addr: Ipv4Address) -> Option<EthernetAddress> {
        self.neighbors.remove(&protocol_addr)
    }

    /// Iterate over all live mappings.
    pub fn neighbors(&self, now: Instant) -> impl Iterator<Item=Neighbor> + '_ {
        self.neighbors.iter(now).map(|(&protocol_addr, &hardware_addr, stamp)| Neighbor {
            protocol_addr,
            hardware_addr,
            stamp,
        })
    }

    /// Check if a packet for `addr` waits for its resolution.
    pub fn is_pending(&self, addr: Ipv4Address, now: Instant) -> bool {
        self.pending.contains_key(&addr, now)
    }

    /// Broadcast a request for the hardware address of `target`.
    pub fn request<D: Device>(&self, eth: &mut eth::Controller<D>, target: Ipv4Address)
        -> Result<()>
    {
        let repr = arp::Repr::EthernetIpv4 {
            operation: arp::Operation::Request,
            source_hardware_addr: eth.src_addr(),
            source_protocol_addr: self.addr,
            target_hardware_addr: EthernetAddress([0; 6]),
            target_protocol_addr: target,
        };

        net_debug!("arp: who has {} tell {}", target, self.addr);
        self.emit(eth, repr, EthernetAddress::BROADCAST)
    }

    /// Answer a request of `target`.
    pub fn reply<D: Device>(
        &self,
        eth: &mut eth::Controller<D>,
        target_protocol_addr: Ipv4Address,
        target_hardware_addr: EthernetAddress,
    ) -> Result<()> {
        let repr = arp::Repr::EthernetIpv4 {
            operation: arp::Operation::Reply,
            source_hardware_addr: eth.src_addr(),
            source_protocol_addr: self.addr,
            target_hardware_addr,
            target_protocol_addr,
        };

        self.emit(eth, repr, target_hardware_addr)
    }

    /// Announce our own mapping with a gratuitous request.
    pub fn announce<D: Device>(&self, eth: &mut eth::Controller<D>) -> Result<()> {
        self.request(eth, self.addr)
    }

    /// Process the payload of a received ARP frame.
    ///
    /// Invalid packets are dropped. Valid packets teach us the sender's mapping, requests for our
    /// address are answered and a reply releases the packet queued for its sender.
    pub fn receive<D: Device>(&mut self, eth: &mut eth::Controller<D>, payload: &[u8])
        -> Result<()>
    {
        let repr = match arp::arp::new_checked(payload).and_then(arp::Repr::parse) {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("arp: dropped packet: {}", err);
                return Ok(());
            },
        };

        let (operation, sender_mac, sender_ip, target_ip) = match repr {
            arp::Repr::EthernetIpv4 {
                operation,
                source_hardware_addr,
                source_protocol_addr,
                target_protocol_addr,
                ..
            } => (operation, source_hardware_addr, source_protocol_addr, target_protocol_addr),
        };

        net_trace!("arp: received {}", repr);
        let now = eth.timestamp();
        let for_us = operation == arp::Operation::Request && target_ip == self.addr;

        if self.learns(sender_ip, for_us, now) {
            match self.neighbors.set(sender_ip, sender_mac, now) {
                Ok(()) => net_debug!("arp: {} is at {}", sender_ip, sender_mac),
                Err(err) => net_debug!("arp: not learning {}: {}", sender_ip, err),
            }
        }

        match operation {
            arp::Operation::Request if for_us => {
                self.reply(eth, sender_ip, sender_mac)
            },
            arp::Operation::Reply => match self.pending.take(&sender_ip, now) {
                Some(mut queued) => {
                    net_debug!("arp: releasing queued packet for {}", sender_ip);
                    eth.send(&mut queued, sender_mac, EthernetProtocol::Ipv4)
                },
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }

    /// Send an IPv4 packet to a neighbor, resolving its address first if necessary.
    ///
    /// If the address is unknown the packet is copied into the queue and a request goes out. While
    /// that entry lives, further packets to the same address are dropped and no further requests
    /// are sent. Unspecified and multicast addresses can not be resolved and are `Unreachable`.
    pub fn send<D: Device>(
        &mut self,
        eth: &mut eth::Controller<D>,
        buffer: &mut PacketBuffer,
        dst_addr: Ipv4Address,
    ) -> Result<()> {
        let now = eth.timestamp();
        if let Some(hardware_addr) = self.lookup(dst_addr, now) {
            return eth.send(buffer, hardware_addr, EthernetProtocol::Ipv4);
        }

        if dst_addr.is_unspecified() || dst_addr.is_multicast() {
            return Err(Error::Unreachable);
        }

        if self.pending.contains_key(&dst_addr, now) {
            net_debug!("arp: {} still unresolved, dropping packet", dst_addr);
            return Ok(());
        }

        self.pending.set(dst_addr, buffer.clone(), now)?;
        self.request(eth, dst_addr)
    }

    fn learns(&self, sender_ip: Ipv4Address, for_us: bool, now: Instant) -> bool {
        self.learn_unsolicited
            || for_us
            || self.neighbors.contains_key(&sender_ip, now)
            || self.pending.contains_key(&sender_ip, now)
    }

    fn emit<D: Device>(&self, eth: &mut eth::Controller<D>, repr: arp::Repr, dst: EthernetAddress)
        -> Result<()>
    {
        let mut buffer = PacketBuffer::new(repr.buffer_len());
        repr.emit(arp::arp::new_unchecked_mut(buffer.as_mut_slice()));
        eth.send(&mut buffer, dst, EthernetProtocol::Arp)
    }
}
