use crate::layer::Result;
use crate::nic::Device;
use crate::storage::PacketBuffer;
use crate::time::Instant;
use crate::wire::{ethernet, EthernetAddress, EthernetProtocol};

/// The local state of the link layer.
#[derive(Clone, Copy, Debug)]
pub struct Endpoint {
    /// Our own address, the source of all outgoing frames.
    addr: EthernetAddress,
}

/// The endpoint borrowed for sending on a device.
pub struct Controller<'a, D> {
    endpoint: &'a Endpoint,
    device: &'a mut D,
}

impl Endpoint {
    /// Create an endpoint with the given hardware address.
    pub fn new(addr: EthernetAddress) -> Self {
        Endpoint { addr }
    }

    /// The local hardware address.
    pub fn addr(&self) -> EthernetAddress {
        self.addr
    }

    /// Change the local hardware address.
    pub fn set_addr(&mut self, addr: EthernetAddress) {
        self.addr = addr;
    }

    /// Validate a received frame and strip its header.
    ///
    /// On success the window of `buffer` holds the payload. Frames too short for a header are
    /// dropped, the destination address is not checked.
    pub fn receive(&self, buffer: &mut PacketBuffer) -> Option<ethernet::Repr> {
        let repr = match ethernet::ethernet::new_checked(buffer.as_slice())
            .and_then(ethernet::Repr::parse)
        {
            Ok(repr) => repr,
            Err(err) => {
                net_trace!("eth: dropped frame of {} bytes: {}", buffer.len(), err);
                return None;
            },
        };

        net_trace!("eth: received {}", repr);
        buffer.remove_header(repr.header_len()).ok()?;
        Some(repr)
    }

    /// Borrow the endpoint together with a device for sending.
    pub fn controller<'a, D: Device>(&'a self, device: &'a mut D) -> Controller<'a, D> {
        Controller {
            endpoint: self,
            device,
        }
    }
}

impl<D: Device> Controller<'_, D> {
    /// The local hardware address.
    pub fn src_addr(&self) -> EthernetAddress {
        self.endpoint.addr
    }

    /// The current time of the device.
    pub fn timestamp(&self) -> Instant {
        self.device.timestamp()
    }

    /// Frame the window of `buffer` and transmit it.
    ///
    /// Pads the payload to the Ethernet minimum, then pushes the header. The window of `buffer`
    /// holds the complete frame afterwards.
    pub fn send(
        &mut self,
        buffer: &mut PacketBuffer,
        dst_addr: EthernetAddress,
        ethertype: EthernetProtocol,
    ) -> Result<()> {
        if buffer.len() < ethernet::MIN_PAYLOAD_LEN {
            buffer.add_padding(ethernet::MIN_PAYLOAD_LEN - buffer.len())?;
        }

        let repr = ethernet::Repr {
            src_addr: self.endpoint.addr,
            dst_addr,
            ethertype,
        };

        buffer.add_header(repr.header_len())?;
        repr.emit(ethernet::ethernet::new_unchecked_mut(buffer.as_mut_slice()));

        net_trace!("eth: sending {}", repr);
        self.device.send(buffer.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nic::External;

    const HOST: EthernetAddress = EthernetAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const PEER: EthernetAddress = EthernetAddress([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

    #[test]
    fn pads_short_payload() {
        let endpoint = Endpoint::new(HOST);
        let mut nic = External::new();

        let mut buffer = PacketBuffer::from_slice(&[0xaa; 28]);
        endpoint.controller(&mut nic)
            .send(&mut buffer, PEER, EthernetProtocol::Arp)
            .unwrap();

        let sent = nic.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].len(), ethernet::HEADER_LEN + ethernet::MIN_PAYLOAD_LEN);

        let frame = ethernet::ethernet::new_checked(&sent[0]).unwrap();
        assert_eq!(frame.dst_addr(), PEER);
        assert_eq!(frame.src_addr(), HOST);
        assert_eq!(frame.ethertype(), EthernetProtocol::Arp);
        assert_eq!(&frame.payload_slice()[..28], &[0xaa; 28][..]);
        assert!(frame.payload_slice()[28..].iter().all(|&b| b == 0));
    }

    #[test]
    fn long_payload_unpadded() {
        let endpoint = Endpoint::new(HOST);
        let mut nic = External::new();

        let mut buffer = PacketBuffer::new(100);
        endpoint.controller(&mut nic)
            .send(&mut buffer, EthernetAddress::BROADCAST, EthernetProtocol::Ipv4)
            .unwrap();
        assert_eq!(nic.sent()[0].len(), 114);
    }

    #[test]
    fn receive_strips_header() {
        let endpoint = Endpoint::new(HOST);
        let mut bytes = vec![0; 20];
        {
            let frame = ethernet::ethernet::new_unchecked_mut(&mut bytes);
            ethernet::Repr {
                src_addr: PEER,
                // Not ours, still accepted.
                dst_addr: EthernetAddress([0x02, 0, 0, 0, 0, 0x99]),
                ethertype: EthernetProtocol::Ipv4,
            }.emit(frame);
            frame.payload_mut_slice().copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        }

        let mut buffer = PacketBuffer::from_slice(&bytes);
        let repr = endpoint.receive(&mut buffer).unwrap();
        assert_eq!(repr.src_addr, PEER);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4, 5, 6]);

        let mut short = PacketBuffer::from_slice(&bytes[..13]);
        assert_eq!(endpoint.receive(&mut short), None);
    }
}
