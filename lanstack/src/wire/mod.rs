/*! Low-level packet access and construction.

The `wire` module deals with the packet *representation*. It provides two levels of
functionality.

 * First, it provides functions to extract fields from sequences of octets, and to insert fields
   into sequences of octets. This happens in the lowercase byte wrappers, e.g.
   [`ethernet::ethernet`] or [`udp::udp`].
 * Second, it provides a compact, high-level representation of header data that can be created
   from parsing and emitted into a sequence of octets. This happens through the `Repr` family of
   structs and enums, e.g. [`arp::Repr`] or [`ipv4::Repr`].

If the `check_len` method of a byte wrapper returned `Ok(())`, then no field accessor or setter
method will panic. The `new_checked` constructors combine construction with that check and must be
used for all untrusted input. When emitting output, it is *incorrect* to use `new_checked`, the
length fields of a reused buffer are garbage until written.

[`ethernet::ethernet`]: ethernet/struct.ethernet.html
[`udp::udp`]: udp/struct.udp.html
[`arp::Repr`]: arp/enum.Repr.html
[`ipv4::Repr`]: ipv4/struct.Repr.html
*/
// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
#![allow(missing_docs)]

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

mod error;
pub(crate) mod checksum;

pub mod arp;
pub mod ethernet;
pub mod icmpv4;
pub mod ipv4;
pub mod udp;

pub use self::error::{Error, Result};

pub use self::ethernet::{
    Address as EthernetAddress,
    EtherType as EthernetProtocol};

pub use self::ipv4::{
    Address as Ipv4Address,
    Protocol as IpProtocol};
