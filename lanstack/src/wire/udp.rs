use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::checksum;
use super::ipv4::{Address, Protocol};

/// The length of the UDP header.
pub const HEADER_LEN: usize = field::CHECKSUM.end;

byte_wrapper! {
    /// A byte sequence representing a UDP packet.
    #[derive(Debug, PartialEq, Eq)]
    pub struct udp([u8]);
}

mod field {
    #![allow(non_snake_case)]

    use crate::wire::field::*;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const LENGTH:   Field = 4..6;
    pub(crate) const CHECKSUM: Field = 6..8;

    pub(crate) fn PAYLOAD(length: u16) -> Field {
        CHECKSUM.end..(length as usize)
    }
}

impl udp {
    /// Imbue a raw octet buffer with UDP packet structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with UDP packet structure.
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

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    /// Returns `Err(Error::Malformed)` if the length field has a value smaller
    /// than the header length.
    ///
    /// The result of this check is invalidated by calling [set_len].
    ///
    /// [set_len]: #method.set_len
    pub fn check_len(&self) -> Result<()> {
        let buffer_len = self.0.len();
        if buffer_len < HEADER_LEN {
            return Err(Error::Truncated);
        }

        let field_len = usize::from(self.len());
        if buffer_len < field_len {
            Err(Error::Truncated)
        } else if field_len < HEADER_LEN {
            Err(Error::Malformed)
        } else {
            Ok(())
        }
    }

    /// Return the source port field.
    #[inline]
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::SRC_PORT])
    }

    /// Return the destination port field.
    #[inline]
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::DST_PORT])
    }

    /// Return the length field, header included.
    #[inline]
    pub fn len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the checksum field.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Set the source port field.
    #[inline]
    pub fn set_src_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::SRC_PORT], value)
    }

    /// Set the destination port field.
    #[inline]
    pub fn set_dst_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::DST_PORT], value)
    }

    /// Set the length field.
    #[inline]
    pub fn set_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], value)
    }

    /// Set the checksum field.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    fn sum(&self, src_addr: Address, dst_addr: Address) -> u16 {
        checksum::combine(&[
            checksum::pseudo_header(src_addr, dst_addr, Protocol::Udp, self.len()),
            checksum::data(&self.0[..usize::from(self.len())]),
        ])
    }

    /// Compute and fill in the checksum, covering the pseudo header.
    pub fn fill_checksum(&mut self, src_addr: Address, dst_addr: Address) {
        self.set_checksum(0);
        let checksum = !self.sum(src_addr, dst_addr);
        // A zero checksum means "no checksum", all ones is the same value in ones' complement.
        self.set_checksum(if checksum == 0 { 0xffff } else { checksum })
    }

    /// Validate the packet checksum, covering the pseudo header.
    pub fn verify_checksum(&self, src_addr: Address, dst_addr: Address) -> bool {
        self.sum(src_addr, dst_addr) == !0
    }

    /// Return the payload as a byte slice.
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[field::PAYLOAD(self.len())]
    }

    /// Return the payload as a mutable byte slice.
    pub fn payload_mut_slice(&mut self) -> &mut [u8] {
        let range = field::PAYLOAD(self.len());
        &mut self.0[range]
    }
}

impl AsRef<[u8]> for udp {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A high-level representation of a User Datagram Protocol packet header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    pub src_port: u16,
    pub dst_port: u16,
    /// The length of header and payload.
    pub length: u16,
}

impl Repr {
    /// Parse a User Datagram Protocol packet and return a high-level representation.
    ///
    /// A zero checksum field means the sender did not compute one and is accepted.
    pub fn parse(packet: &udp, src_addr: Address, dst_addr: Address) -> Result<Repr> {
        packet.check_len()?;

        if packet.checksum() != 0 && !packet.verify_checksum(src_addr, dst_addr) {
            return Err(Error::WrongChecksum);
        }

        Ok(Repr {
            src_port: packet.src_port(),
            dst_port: packet.dst_port(),
            length: packet.len(),
        })
    }

    /// Return the length of a packet that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        self.length.into()
    }

    /// Return the length of the payload.
    pub fn payload_len(&self) -> usize {
        usize::from(self.length) - HEADER_LEN
    }

    /// Emit the header into a packet whose payload was already written, then fill the checksum.
    pub fn emit(&self, packet: &mut udp, src_addr: Address, dst_addr: Address) {
        packet.set_src_port(self.src_port);
        packet.set_dst_port(self.dst_port);
        packet.set_len(self.length);
        packet.fill_checksum(src_addr, dst_addr);
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UDP src={} dst={} len={}",
               self.src_port, self.dst_port, self.payload_len())
    }
}
