// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use super::{ifreq, Errno, LibcResult, IoctlResult};
use libc;

pub(crate) const ETH_P_ALL:    libc::c_short = 0x0003;

/// Adds a method to open a tap.
///
/// This is an extension trait implemented for `ifreq` in Linux.
pub(crate) trait TunSetIf {
    /// Attach the descriptor to a tap without packet information, creating it if necessary.
    fn tun_set_tap(&self, fd: libc::c_int) -> Result<(), Errno>;
}

/// Adds a method to interact with the mtu.
pub(crate) trait NetdeviceMtu {
    fn get_mtu(&self, fd: libc::c_int) -> Result<libc::c_int, Errno>;
}

pub(crate) trait IfIndex {
    fn get_if_index(&self, fd: libc::c_int) -> Result<libc::c_int, Errno>;
}

/// An interface request with a single trailing argument.
///
/// The kernel reads and writes the union following the name. All requests used here only need a
/// single integer of it.
#[repr(C)]
struct Request {
    interface: ifreq,
    argument: libc::c_int,
}

impl ifreq {
    const SIOCGIFMTU:   libc::Ioctl = 0x8921;
    const SIOCGIFINDEX: libc::Ioctl = 0x8933;

    const TUNSETIFF:    libc::Ioctl = 0x400454CA;
    const IFF_TAP:      libc::c_int  = 0x0002;
    const IFF_NO_PI:    libc::c_int  = 0x1000;

    /// Perform the ioctl and return the argument as left by the kernel.
    fn request(&self, fd: libc::c_int, code: libc::Ioctl, argument: libc::c_int)
        -> Result<libc::c_int, Errno>
    {
        let mut request = Request {
            interface: *self,
            argument,
        };

        let res = unsafe {
            libc::ioctl(fd, code, &mut request as *mut Request)
        };

        IoctlResult(res).errno()?;
        Ok(request.argument)
    }
}

impl TunSetIf for ifreq {
    fn tun_set_tap(&self, fd: libc::c_int) -> Result<(), Errno> {
        self.request(fd, Self::TUNSETIFF, Self::IFF_TAP | Self::IFF_NO_PI)
            .map(|_| ())
    }
}

impl NetdeviceMtu for ifreq {
    fn get_mtu(&self, fd: libc::c_int) -> Result<libc::c_int, Errno> {
        self.request(fd, Self::SIOCGIFMTU, 0)
    }
}

impl IfIndex for ifreq {
    fn get_if_index(&self, fd: libc::c_int) -> Result<libc::c_int, Errno> {
        self.request(fd, Self::SIOCGIFINDEX, 0)
    }
}
