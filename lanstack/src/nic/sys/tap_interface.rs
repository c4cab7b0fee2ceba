// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use std::os::unix::io::{RawFd, AsRawFd};

use libc;
use super::{now, Errno, FdResult, IoLenResult, LibcResult, ifreq};
use super::linux::{NetdeviceMtu, TunSetIf};

use crate::layer;
use crate::nic::Device;
use crate::time::Instant;

/// A static descriptor for interacting with a tap interface.
///
/// Contains the file descriptor and a pre-filled `ifreq` structure with the interface name that is
/// required for `ioctl` calls. This offers the raw methods for reading and writing. Wrap it in a
/// [`TapInterface`] to use it as a `nic::Device`.
///
/// [`TapInterface`]: struct.TapInterface.html
#[derive(Debug)]
pub struct TapInterfaceDesc {
    lower: libc::c_int,
    ifreq: ifreq
}

/// A tap interface, usable as a network device.
///
/// Uses the errno principle for storing the last underlying error on a failed operation. The
/// descriptor is non-blocking, so receiving never waits. Combine with [`wait`] for an idle loop.
///
/// [`wait`]: fn.wait.html
#[derive(Debug)]
pub struct TapInterface {
    inner: TapInterfaceDesc,
    last_err: Option<Errno>,
}

impl AsRawFd for TapInterfaceDesc {
    fn as_raw_fd(&self) -> RawFd {
        self.lower
    }
}

impl AsRawFd for TapInterface {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}

static TAP_PATH: &[u8] = b"/dev/net/tun\0";

impl TapInterfaceDesc {
    /// Try to open the tun device for the named interface.
    ///
    /// Note that this does *not* yet set the interface for the file descriptor, it only creates
    /// the necessary structures involved in doing so. Call [`attach_interface`] afterwards.
    ///
    /// [`attach_interface`]: #method.attach_interface
    pub fn new(name: &str) -> Result<TapInterfaceDesc, Errno> {
        let lower = unsafe {
            libc::open(
                TAP_PATH.as_ptr() as *const libc::c_char,
                libc::O_RDWR | libc::O_NONBLOCK)
        };

        FdResult(lower).errno()?;

        Ok(TapInterfaceDesc {
            lower,
            ifreq: ifreq::new(name),
        })
    }

    /// Update the file descriptor to the named interface.
    ///
    /// See `ioctl` with `TUNSETIFF` for details on errors.
    pub fn attach_interface(&mut self) -> Result<(), Errno> {
        self.ifreq.tun_set_tap(self.lower)
    }

    /// Try to find the mtu of the tap.
    ///
    /// The tun descriptor does not answer interface queries, a throwaway `AF_INET` socket does.
    pub fn interface_mtu(&mut self) -> Result<usize, Errno> {
        let query = unsafe {
            libc::socket(libc::AF_INET, libc::SOCK_DGRAM, libc::IPPROTO_IP)
        };

        FdResult(query).errno()?;

        let mtu = self.ifreq.get_mtu(query)
            .map(|mtu| mtu as usize);

        unsafe { libc::close(query); }

        mtu
    }

    /// Receive a single frame on the tap into the buffer.
    pub fn recv(&mut self, buffer: &mut [u8]) -> Result<usize, Errno> {
        let len = unsafe {
            libc::read(
                self.lower,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len())
        };
        IoLenResult(len).errno()?;
        Ok(len as usize)
    }

    /// Send a single frame onto the tap from the buffer.
    pub fn send(&mut self, buffer: &[u8]) -> Result<usize, Errno> {
        let len = unsafe {
            libc::write(
                self.lower,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len())
        };
        IoLenResult(len).errno()?;
        Ok(len as usize)
    }
}

impl Drop for TapInterfaceDesc {
    fn drop(&mut self) {
        unsafe { libc::close(self.lower); }
    }
}

impl TapInterface {
    /// Open and attach a tap interface by name.
    pub fn new(name: &str) -> Result<Self, Errno> {
        let inner = TapInterfaceDesc::new(name)?;
        Self::with_descriptor(inner)
    }

    /// Attach an existing descriptor and wrap it into a device.
    pub fn with_descriptor(mut inner: TapInterfaceDesc) -> Result<Self, Errno> {
        inner.attach_interface()?;
        Ok(TapInterface {
            inner,
            last_err: None,
        })
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

impl Device for TapInterface {
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
