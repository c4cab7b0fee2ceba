//! Numeric configuration of a stack.
//!
//! The core only consumes a [`Config`], it never produces or mutates one. Every field is public
//! and the `Default` matches a host-only virtual network on `192.168.56.0/24`.
//!
//! [`Config`]: struct.Config.html
use crate::time::Duration;
use crate::wire::{EthernetAddress, Ipv4Address, ipv4};

/// The smallest MTU every IPv4 link must support.
pub const MIN_MTU: usize = 68;

/// Addresses, limits and timers of a single stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The local IPv4 address.
    pub ip_addr: Ipv4Address,

    /// The local hardware address, used as the source of every frame.
    pub mac_addr: EthernetAddress,

    /// Largest IP datagram the link carries, header included.
    pub mtu: usize,

    /// Lifetime of a learned neighbor.
    pub arp_timeout: Duration,

    /// Minimum time between two requests for the same unresolved address.
    ///
    /// This is also how long a queued packet waits for its resolution.
    pub arp_retry: Duration,

    /// The time to live of outgoing datagrams.
    pub hop_limit: u8,

    /// Byte budget of each table, the number of slots is derived from it.
    pub map_budget: usize,

    /// Record the sender of every valid ARP packet.
    ///
    /// When disabled only senders we are already talking to are learned: those already in the
    /// cache, those with a packet waiting for them and those asking for our own address.
    pub arp_learn_unsolicited: bool,

    /// Answer echo requests.
    pub answer_echo: bool,
}

impl Config {
    /// A default configuration for another address pair.
    pub fn new(ip_addr: Ipv4Address, mac_addr: EthernetAddress) -> Self {
        Config {
            ip_addr,
            mac_addr,
            ..Config::default()
        }
    }

    /// The MTU actually used, clamped to the IPv4 bounds.
    pub fn effective_mtu(&self) -> usize {
        self.mtu.max(MIN_MTU).min(ipv4::MAX_TOTAL_LEN)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ip_addr: Ipv4Address::new(192, 168, 56, 2),
            mac_addr: EthernetAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            mtu: 1500,
            arp_timeout: Duration::from_secs(300),
            arp_retry: Duration::from_secs(1),
            hop_limit: 64,
            map_budget: 16 * 1024,
            arp_learn_unsolicited: true,
            answer_echo: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.ip_addr, "192.168.56.2".parse().unwrap());
        assert_eq!(config.mac_addr, "00:11:22:33:44:55".parse().unwrap());
        assert_eq!(config.effective_mtu(), 1500);
        assert_eq!(config.arp_timeout, Duration::from_secs(300));
        assert_eq!(config.arp_retry, Duration::from_secs(1));
        assert_eq!(config.hop_limit, 64);
    }

    #[test]
    fn mtu_clamped() {
        let mut config = Config::new(Ipv4Address::new(10, 0, 0, 1), EthernetAddress([2, 0, 0, 0, 0, 1]));
        config.mtu = 20;
        assert_eq!(config.effective_mtu(), MIN_MTU);
        config.mtu = 1 << 20;
        assert_eq!(config.effective_mtu(), ipv4::MAX_TOTAL_LEN);
    }
}
