use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::ethernet::{Address as EthernetAddress, EtherType as Protocol};
use super::ipv4::Address as Ipv4Address;

enum_with_unknown! {
    /// ARP hardware type.
    pub enum Hardware(u16) {
        Ethernet = 1,
    }
}

enum_with_unknown! {
    /// ARP operation type.
    pub enum Operation(u16) {
        Request = 1,
        Reply = 2,
    }
}

/// The length of an ARP packet for Ethernet and IPv4.
pub const PACKET_LEN: usize = field::TPA.end;

byte_wrapper! {
    /// A byte sequence representing an ARP packet.
    ///
    /// The address accessors assume the Ethernet and IPv4 layout, six and four octets. Check the
    /// length fields (or use [`Repr::parse`]) before reading them.
    ///
    /// [`Repr::parse`]: enum.Repr.html#method.parse
    #[derive(Debug, PartialEq, Eq)]
    pub struct arp([u8]);
}

mod field {
    #![allow(non_snake_case)]

    use crate::wire::field::*;

    pub(crate) const HTYPE: Field = 0..2;
    pub(crate) const PTYPE: Field = 2..4;
    pub(crate) const HLEN:  usize = 4;
    pub(crate) const PLEN:  usize = 5;
    pub(crate) const OPER:  Field = 6..8;

    pub(crate) const SHA:   Field = 8..14;
    pub(crate) const SPA:   Field = 14..18;
    pub(crate) const THA:   Field = 18..24;
    pub(crate) const TPA:   Field = 24..28;
}

impl arp {
    /// Imbue a raw octet buffer with ARP packet structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with ARP packet structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of `new_unchecked` and `check_len`.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked(data))
    }

    /// Unwrap the packet as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ensure that no fixed field accessor will panic and that the buffer holds the addresses
    /// announced by the length fields.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < field::OPER.end {
            return Err(Error::Truncated);
        }

        let addresses = 2 * (usize::from(self.hardware_len()) + usize::from(self.protocol_len()));
        if len < field::OPER.end + addresses {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the hardware type field.
    pub fn hardware_type(&self) -> Hardware {
        Hardware::from(NetworkEndian::read_u16(&self.0[field::HTYPE]))
    }

    /// Return the protocol type field.
    pub fn protocol_type(&self) -> Protocol {
        Protocol::from(NetworkEndian::read_u16(&self.0[field::PTYPE]))
    }

    /// Return the hardware length field.
    pub fn hardware_len(&self) -> u8 {
        self.0[field::HLEN]
    }

    /// Return the protocol length field.
    pub fn protocol_len(&self) -> u8 {
        self.0[field::PLEN]
    }

    /// Return the operation field.
    pub fn operation(&self) -> Operation {
        Operation::from(NetworkEndian::read_u16(&self.0[field::OPER]))
    }

    /// Return the source hardware address field.
    pub fn source_hardware_addr(&self) -> EthernetAddress {
        EthernetAddress::from_bytes(&self.0[field::SHA])
    }

    /// Return the source protocol address field.
    pub fn source_protocol_addr(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::SPA])
    }

    /// Return the target hardware address field.
    pub fn target_hardware_addr(&self) -> EthernetAddress {
        EthernetAddress::from_bytes(&self.0[field::THA])
    }

    /// Return the target protocol address field.
    pub fn target_protocol_addr(&self) -> Ipv4Address {
        Ipv4Address::from_bytes(&self.0[field::TPA])
    }

    /// Set the hardware type field.
    pub fn set_hardware_type(&mut self, value: Hardware) {
        NetworkEndian::write_u16(&mut self.0[field::HTYPE], value.into())
    }

    /// Set the protocol type field.
    pub fn set_protocol_type(&mut self, value: Protocol) {
        NetworkEndian::write_u16(&mut self.0[field::PTYPE], value.into())
    }

    /// Set the hardware length field.
    pub fn set_hardware_len(&mut self, value: u8) {
        self.0[field::HLEN] = value
    }

    /// Set the protocol length field.
    pub fn set_protocol_len(&mut self, value: u8) {
        self.0[field::PLEN] = value
    }

    /// Set the operation field.
    pub fn set_operation(&mut self, value: Operation) {
        NetworkEndian::write_u16(&mut self.0[field::OPER], value.into())
    }

    /// Set the source hardware address field.
    pub fn set_source_hardware_addr(&mut self, value: EthernetAddress) {
        self.0[field::SHA].copy_from_slice(value.as_bytes())
    }

    /// Set the source protocol address field.
    pub fn set_source_protocol_addr(&mut self, value: Ipv4Address) {
        self.0[field::SPA].copy_from_slice(value.as_bytes())
    }

    /// Set the target hardware address field.
    pub fn set_target_hardware_addr(&mut self, value: EthernetAddress) {
        self.0[field::THA].copy_from_slice(value.as_bytes())
    }

    /// Set the target protocol address field.
    pub fn set_target_protocol_addr(&mut self, value: Ipv4Address) {
        self.0[field::TPA].copy_from_slice(value.as_bytes())
    }
}

impl AsRef<[u8]> for arp {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A high-level representation of an Address Resolution Protocol packet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Repr {
    /// An Ethernet and IPv4 Address Resolution Protocol packet.
    EthernetIpv4 {
        operation: Operation,
        source_hardware_addr: EthernetAddress,
        source_protocol_addr: Ipv4Address,
        target_hardware_addr: EthernetAddress,
        target_protocol_addr: Ipv4Address,
    },
}

impl Repr {
    /// Parse an Address Resolution Protocol packet and return a high-level representation.
    ///
    /// Only requests and replies for Ethernet and IPv4 are recognized.
    pub fn parse(packet: &arp) -> Result<Repr> {
        packet.check_len()?;
        match (
            packet.hardware_type(),
            packet.protocol_type(),
            packet.hardware_len(),
            packet.protocol_len(),
            packet.operation(),
        ) {
            (Hardware::Ethernet, Protocol::Ipv4, 6, 4, operation @ Operation::Request)
            | (Hardware::Ethernet, Protocol::Ipv4, 6, 4, operation @ Operation::Reply) => {
                Ok(Repr::EthernetIpv4 {
                    operation,
                    source_hardware_addr: packet.source_hardware_addr(),
                    source_protocol_addr: packet.source_protocol_addr(),
                    target_hardware_addr: packet.target_hardware_addr(),
                    target_protocol_addr: packet.target_protocol_addr(),
                })
            },
            _ => Err(Error::Unrecognized),
        }
    }

    /// Return the length of a packet that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        match self {
            Repr::EthernetIpv4 { .. } => PACKET_LEN,
        }
    }

    /// Emit a high-level representation into an Address Resolution Protocol packet.
    pub fn emit(&self, packet: &mut arp) {
        match *self {
            Repr::EthernetIpv4 {
                operation,
                source_hardware_addr,
                source_protocol_addr,
                target_hardware_addr,
                target_protocol_addr,
            } => {
                packet.set_hardware_type(Hardware::Ethernet);
                packet.set_protocol_type(Protocol::Ipv4);
                packet.set_hardware_len(6);
                packet.set_protocol_len(4);
                packet.set_operation(operation);
                packet.set_source_hardware_addr(source_hardware_addr);
                packet.set_source_protocol_addr(source_protocol_addr);
                packet.set_target_hardware_addr(target_hardware_addr);
                packet.set_target_protocol_addr(target_protocol_addr);
            },
        }
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Repr::EthernetIpv4 {
                operation,
                source_hardware_addr,
                source_protocol_addr,
                target_hardware_addr,
                target_protocol_addr,
            } => {
                write!(f, "ARP type=Ethernet+IPv4 src={}/{} tgt={}/{} op={:?}",
                       source_hardware_addr, source_protocol_addr,
                       target_hardware_addr, target_protocol_addr,
                       operation)
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static PACKET_BYTES: [u8; 28] = [
        0x00, 0x01,
        0x08, 0x00,
        0x06,
        0x04,
        0x00, 0x02,
        0x11, 0x12, 0x13, 0x14, 0x15, 0x16,
        0x21, 0x22, 0x23, 0x24,
        0x31, 0x32, 0x33, 0x34, 0x35, 0x36,
        0x41, 0x42, 0x43, 0x44,
    ];

    fn packet_repr() -> Repr {
        Repr::EthernetIpv4 {
            operation: Operation::Reply,
            source_hardware_addr: EthernetAddress([0x11, 0x12, 0x13, 0x14, 0x15, 0x16]),
            source_protocol_addr: Ipv4Address::new(0x21, 0x22, 0x23, 0x24),
            target_hardware_addr: EthernetAddress([0x31, 0x32, 0x33, 0x34, 0x35, 0x36]),
            target_protocol_addr: Ipv4Address::new(0x41, 0x42, 0x43, 0x44),
        }
    }

    #[test]
    fn test_parse() {
        let packet = arp::new_checked(&PACKET_BYTES[..]).unwrap();
        assert_eq!(Repr::parse(packet), Ok(packet_repr()));
    }

    #[test]
    fn test_emit() {
        let mut bytes = vec![0xa5; 28];
        packet_repr().emit(arp::new_unchecked_mut(&mut bytes));
        assert_eq!(&bytes[..], &PACKET_BYTES[..]);
    }

    #[test]
    fn test_truncated() {
        assert_eq!(arp::new_checked(&PACKET_BYTES[..7]), Err(Error::Truncated));
        assert_eq!(arp::new_checked(&PACKET_BYTES[..27]), Err(Error::Truncated));
    }

    #[test]
    fn test_unrecognized() {
        let fields: [(usize, u8); 5] = [(1, 0x06), (2, 0x86), (4, 0x08), (5, 0x10), (7, 0x03)];
        for &(index, value) in fields.iter() {
            let mut bytes = PACKET_BYTES.to_vec();
            bytes.extend_from_slice(&[0; 32]);
            bytes[index] = value;
            let packet = arp::new_checked(&bytes).unwrap();
            assert_eq!(Repr::parse(packet), Err(Error::Unrecognized), "field {}", index);
        }
    }
}
