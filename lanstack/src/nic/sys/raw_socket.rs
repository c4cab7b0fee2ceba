// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use core::mem;
use std::os::unix::io::{RawFd, AsRawFd};

use libc;
use super::{ifreq, linux, now, Errno, FdResult, LibcResult, IoLenResult};
use super::linux::{IfIndex, NetdeviceMtu};

use crate::layer;
use crate::nic::Device;
use crate::time::Instant;

/// A static descriptor for interacting with a raw socket.
///
/// Contains the file descriptor and a pre-filled `ifreq` structure with the interface name that is
/// required for `ioctl` calls. This offers the raw methods for reading and writing. Wrap it in a
/// [`RawSocket`] to use it as a `nic::Device`.
///
/// [`RawSocket`]: struct.RawSocket.html
#[derive(Debug)]
pub struct RawSocketDesc {
    lower: libc::c_int,
    ifreq: ifreq
}

/// A raw packet socket bound to one interface, usable as a network device.
///
/// Opening one usually requires `CAP_NET_RAW`. The socket sees all traffic of the interface, the
/// stack itself does not filter by destination address.
#[derive(Debug)]
pub struct RawSocket {
    inner: RawSocketDesc,
    last_err: Option<Errno>,
}

impl AsRawFd for RawSocketDesc {
    fn as_raw_fd(&self) -> RawFd {
        self.lower
    }
}

impl AsRawFd for RawSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

impl RawSocketDesc {
    /// Try to open a socket for the named interface.
    ///
    /// Note that this does *not* yet bind the interface to the socket, it only creates the
    /// necessary structures involved in doing so. Call [`bind_interface`] afterwards.
    ///
    /// [`bind_interface`]: #method.bind_interface
    pub fn new(name: &str) -> Result<RawSocketDesc, Errno> {
        let lower = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW | libc::SOCK_NONBLOCK,
                linux::ETH_P_ALL.to_be() as i32)
        };

        FdResult(lower).errno()?;

        Ok(RawSocketDesc {
            lower,
            ifreq: ifreq::new(name),
        })
    }

    /// Query the interface MTU, as reported by the OS.
    pub fn interface_mtu(&mut self) -> Result<usize, Errno> {
        self.ifreq.get_mtu(self.lower)
            .map(|mtu| mtu as usize)
    }

    /// Bind the socket to the named interface.
    ///
    /// See `bind` with `AF_PACKET` and `ETH_P_ALL` for errors.
    pub fn bind_interface(&mut self) -> Result<(), Errno> {
        let sockaddr = libc::sockaddr_ll {
            sll_family:   libc::AF_PACKET as u16,
            sll_protocol: linux::ETH_P_ALL.to_be() as u16,
            sll_ifindex:  self.ifreq.get_if_index(self.lower)?,
            sll_hatype:   1,
            sll_pkttype:  0,
            sll_halen:    6,
            sll_addr:     [0; 8],
        };

        let res = unsafe {
            libc::bind(
                self.lower,
                &sockaddr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t)
        };

        FdResult(res).errno()
    }

    /// Receive a single frame into the buffer.
    ///
    /// The socket was opened non-blocking, an idle socket fails with `EWOULDBLOCK`.
    pub fn recv(&mut self, buffer: &mut [u8]) -> Result<usize, Errno> {
        let len = unsafe {
            libc::recv(
                self.lower,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                0)
        };
        IoLenResult(len).errno()?;
        Ok(len as usize)
    }

    /// Send a single frame from a buffer.
    pub fn send(&mut self, buffer: &[u8]) -> Result<usize, Errno> {
        let len = unsafe {
            libc::send(
                self.lower,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
                0)
        };
        IoLenResult(len).errno()?;
        Ok(len as usize)
    }
}

impl Drop for RawSocketDesc {
    fn drop(&mut self) {
        unsafe { libc::close(self.lower); }
    }
}

impl RawSocket {
    /// Open a raw socket and bind it to the named interface.
    pub fn new(name: &str) -> Result<Self, Errno> {
        let mut inner = RawSocketDesc::new(name)?;
        inner.bind_interface()?;
        Ok(Self::with_descriptor(inner))
    }

    /// Wrap an already bound descriptor into a device.
    pub fn with_descriptor(inner: RawSocketDesc) -> Self {
        RawSocket {
            inner,
            last_err: None,
        }
    }

    /// Query the mtu of the interface.
    pub fn interface_mtu(&mut self) -> Result<usize, Errno> {
        self.inner.interface_mtu()
    }

    /// Take the last io error returned by the OS.
    pub fn last_err(&mut self) -> Option<Errno> {
        self.last_err.take()
    }

    fn store_err(&mut self, err: Errno) -> layer::Error {
        self.last_err = Some(err);
        layer::Error::Device
    }
}

impl Device for RawSocket {
    fn send(&mut self, frame: &[u8]) -> layer::Result<()> {
        match self.inner.send(frame) {
            Ok(_) => Ok(()),
            Err(err) => Err(self.store_err(err)),
        }
    }

    fn recv(&mut self, buffer: &mut [u8]) -> layer::Result<Option<usize>> {
        match self.inner.recv(buffer) {
            Ok(len) => Ok(Some(len)),
            Err(ref err) if err.is_would_block() => Ok(None),
            Err(err) => Err(self.store_err(err)),
        }
    }

    fn timestamp(&self) -> Instant {
        now().unwrap_or_default()
    }
}
