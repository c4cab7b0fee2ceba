use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};
use super::checksum;

enum_with_unknown! {
    /// Internet protocol control message type.
    pub enum Message(u8) {
        /// Echo reply
        EchoReply      =  0,
        /// Destination unreachable
        DstUnreachable =  3,
        /// Message redirect
        Redirect       =  5,
        /// Echo request
        EchoRequest    =  8,
        /// Time exceeded
        TimeExceeded   = 11,
        /// Parameter problem
        ParamProblem   = 12,
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::EchoReply      => write!(f, "echo reply"),
            Message::DstUnreachable => write!(f, "destination unreachable"),
            Message::Redirect       => write!(f, "message redirect"),
            Message::EchoRequest    => write!(f, "echo request"),
            Message::TimeExceeded   => write!(f, "time exceeded"),
            Message::ParamProblem   => write!(f, "parameter problem"),
            Message::Unknown(id)    => write!(f, "{}", id)
        }
    }
}

enum_with_unknown! {
    /// Internet protocol control message subtype for type "Destination Unreachable".
    pub enum DstUnreachable(u8) {
        /// Destination network unreachable
        NetUnreachable   =  0,
        /// Destination host unreachable
        HostUnreachable  =  1,
        /// Destination protocol unreachable
        ProtoUnreachable =  2,
        /// Destination port unreachable
        PortUnreachable  =  3,
        /// Fragmentation required, and DF flag set
        FragRequired     =  4,
    }
}

impl fmt::Display for DstUnreachable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DstUnreachable::NetUnreachable =>
                write!(f, "destination network unreachable"),
            DstUnreachable::HostUnreachable =>
                write!(f, "destination host unreachable"),
            DstUnreachable::ProtoUnreachable =>
                write!(f, "destination protocol unreachable"),
            DstUnreachable::PortUnreachable =>
                write!(f, "destination port unreachable"),
            DstUnreachable::FragRequired =>
                write!(f, "fragmentation required, and DF flag set"),
            DstUnreachable::Unknown(id) =>
                write!(f, "{}", id)
        }
    }
}

/// The length of the fixed message header.
pub const HEADER_LEN: usize = field::HEADER_END;

/// The number of payload octets of the offending datagram quoted in error messages.
pub const QUOTED_PAYLOAD_LEN: usize = 8;

byte_wrapper! {
    /// A byte sequence representing an ICMPv4 message.
    #[derive(Debug, PartialEq, Eq)]
    pub struct icmpv4([u8]);
}

mod field {
    use crate::wire::field::*;

    pub(crate) const TYPE:       usize = 0;
    pub(crate) const CODE:       usize = 1;
    pub(crate) const CHECKSUM:   Field = 2..4;

    pub(crate) const UNUSED:     Field = 4..8;

    pub(crate) const ECHO_IDENT: Field = 4..6;
    pub(crate) const ECHO_SEQNO: Field = 6..8;

    pub(crate) const HEADER_END: usize = 8;
}

impl icmpv4 {
    /// Imbue a raw octet buffer with ICMPv4 message structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with ICMPv4 message structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of `new_unchecked` and `check_len`.
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        Self::new_unchecked(data).check_len()?;
        Ok(Self::new_unchecked(data))
    }

    /// Unwrap the message as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than the header.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < field::HEADER_END {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the message type field.
    #[inline]
    pub fn msg_type(&self) -> Message {
        Message::from(self.0[field::TYPE])
    }

    /// Return the message code field.
    #[inline]
    pub fn msg_code(&self) -> u8 {
        self.0[field::CODE]
    }

    /// Return the checksum field.
    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::CHECKSUM])
    }

    /// Return the identifier field (for echo request and reply packets).
    #[inline]
    pub fn echo_ident(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::ECHO_IDENT])
    }

    /// Return the sequence number field (for echo request and reply packets).
    #[inline]
    pub fn echo_seq_no(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::ECHO_SEQNO])
    }

    /// Validate the checksum over the whole message.
    pub fn verify_checksum(&self) -> bool {
        checksum::data(&self.0) == !0
    }

    /// Set the message type field.
    #[inline]
    pub fn set_msg_type(&mut self, value: Message) {
        self.0[field::TYPE] = value.into()
    }

    /// Set the message code field.
    #[inline]
    pub fn set_msg_code(&mut self, value: u8) {
        self.0[field::CODE] = value
    }

    /// Set the checksum field.
    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], value)
    }

    /// Set the identifier field (for echo request and reply packets).
    #[inline]
    pub fn set_echo_ident(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::ECHO_IDENT], value)
    }

    /// Set the sequence number field (for echo request and reply packets).
    #[inline]
    pub fn set_echo_seq_no(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::ECHO_SEQNO], value)
    }

    /// Zero the four octets following the checksum (for error messages).
    pub fn clear_unused(&mut self) {
        for byte in &mut self.0[field::UNUSED] {
            *byte = 0;
        }
    }

    /// Compute and fill in the checksum over the whole message.
    pub fn fill_checksum(&mut self) {
        self.set_checksum(0);
        let checksum = !checksum::data(&self.0);
        self.set_checksum(checksum)
    }

    /// Return the data following the header.
    pub fn data(&self) -> &[u8] {
        &self.0[field::HEADER_END..]
    }

    /// Return the data following the header, mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.0[field::HEADER_END..]
    }
}

impl AsRef<[u8]> for icmpv4 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A high-level representation of an ICMPv4 message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Repr<'a> {
    EchoRequest {
        ident:  u16,
        seq_no: u16,
        data:   &'a [u8],
    },
    EchoReply {
        ident:  u16,
        seq_no: u16,
        data:   &'a [u8],
    },
    /// The data is the header of the offending datagram and the start of its payload.
    DstUnreachable {
        reason: DstUnreachable,
        data:   &'a [u8],
    },
}

impl<'a> Repr<'a> {
    /// Parse an ICMPv4 message and return a high-level representation.
    ///
    /// The checksum is verified. Only echo and destination unreachable messages are recognized.
    pub fn parse(packet: &'a icmpv4) -> Result<Repr<'a>> {
        packet.check_len()?;

        if !packet.verify_checksum() {
            return Err(Error::WrongChecksum);
        }

        match (packet.msg_type(), packet.msg_code()) {
            (Message::EchoRequest, 0) => Ok(Repr::EchoRequest {
                ident:  packet.echo_ident(),
                seq_no: packet.echo_seq_no(),
                data:   packet.data(),
            }),
            (Message::EchoReply, 0) => Ok(Repr::EchoReply {
                ident:  packet.echo_ident(),
                seq_no: packet.echo_seq_no(),
                data:   packet.data(),
            }),
            (Message::DstUnreachable, code) => Ok(Repr::DstUnreachable {
                reason: DstUnreachable::from(code),
                data:   packet.data(),
            }),
            _ => Err(Error::Unrecognized),
        }
    }

    /// Return the length of a message that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        match self {
            Repr::EchoRequest { data, .. }
            | Repr::EchoReply { data, .. }
            | Repr::DstUnreachable { data, .. } => field::HEADER_END + data.len(),
        }
    }

    /// Emit a high-level representation into an ICMPv4 message, including its checksum.
    ///
    /// # Panics
    /// This method panics if the message is not exactly `buffer_len` octets long.
    pub fn emit(&self, packet: &mut icmpv4) {
        match *self {
            Repr::EchoRequest { ident, seq_no, data } => {
                packet.set_msg_type(Message::EchoRequest);
                packet.set_msg_code(0);
                packet.set_echo_ident(ident);
                packet.set_echo_seq_no(seq_no);
                packet.data_mut().copy_from_slice(data);
            },
            Repr::EchoReply { ident, seq_no, data } => {
                packet.set_msg_type(Message::EchoReply);
                packet.set_msg_code(0);
                packet.set_echo_ident(ident);
                packet.set_echo_seq_no(seq_no);
                packet.data_mut().copy_from_slice(data);
            },
            Repr::DstUnreachable { reason, data } => {
                packet.set_msg_type(Message::DstUnreachable);
                packet.set_msg_code(reason.into());
                packet.clear_unused();
                packet.data_mut().copy_from_slice(data);
            },
        }

        packet.fill_checksum();
    }
}

impl fmt::Display for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Repr::EchoRequest { ident, seq_no, data } =>
                write!(f, "ICMPv4 echo request id={} seq={} len={}", ident, seq_no, data.len()),
            Repr::EchoReply { ident, seq_no, data } =>
                write!(f, "ICMPv4 echo reply id={} seq={} len={}", ident, seq_no, data.len()),
            Repr::DstUnreachable { reason, .. } =>
                write!(f, "ICMPv4 destination unreachable ({})", reason),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static ECHO_PACKET_BYTES: [u8; 12] =
        [0x08, 0x00, 0x8e, 0xfe,
         0x12, 0x34, 0xab, 0xcd,
         0xaa, 0x00, 0x00, 0xff];

    static ECHO_DATA_BYTES: [u8; 4] =
        [0xaa, 0x00, 0x00, 0xff];

    #[test]
    fn test_echo_deconstruct() {
        let packet = icmpv4::new_checked(&ECHO_PACKET_BYTES[..]).unwrap();
        assert_eq!(packet.msg_type(), Message::EchoRequest);
        assert_eq!(packet.msg_code(), 0);
        assert_eq!(packet.checksum(), 0x8efe);
        assert_eq!(packet.echo_ident(), 0x1234);
        assert_eq!(packet.echo_seq_no(), 0xabcd);
        assert_eq!(packet.data(), &ECHO_DATA_BYTES[..]);
        assert_eq!(packet.verify_checksum(), true);
    }

    fn echo_repr() -> Repr<'static> {
        Repr::EchoRequest {
            ident:  0x1234,
            seq_no: 0xabcd,
            data:   &ECHO_DATA_BYTES,
        }
    }

    #[test]
    fn test_echo_parse() {
        let packet = icmpv4::new_unchecked(&ECHO_PACKET_BYTES[..]);
        assert_eq!(Repr::parse(packet), Ok(echo_repr()));
    }

    #[test]
    fn test_echo_emit() {
        let repr = echo_repr();
        let mut bytes = vec![0xa5; repr.buffer_len()];
        repr.emit(icmpv4::new_unchecked_mut(&mut bytes));
        assert_eq!(&bytes[..], &ECHO_PACKET_BYTES[..]);
    }

    #[test]
    fn test_wrong_checksum() {
        let mut bytes = ECHO_PACKET_BYTES.to_vec();
        bytes[9] = 0x01;
        assert_eq!(Repr::parse(icmpv4::new_unchecked(&bytes)), Err(Error::WrongChecksum));
    }

    #[test]
    fn test_unreachable_round_trip() {
        let quoted = [0x45u8; 28];
        let repr = Repr::DstUnreachable {
            reason: DstUnreachable::PortUnreachable,
            data: &quoted,
        };
        let mut bytes = vec![0xa5; repr.buffer_len()];
        repr.emit(icmpv4::new_unchecked_mut(&mut bytes));
        assert_eq!(&bytes[..2], &[3, 3]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        let packet = icmpv4::new_checked(&bytes).unwrap();
        assert_eq!(Repr::parse(packet), Ok(repr));
    }
}
