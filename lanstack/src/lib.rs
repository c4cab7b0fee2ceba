//! A minimal user-space network stack for a single Ethernet link.
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The wire module](wire/index.html)
//! 3. [The layers](layer/index.html)
//! 4. [The stack context](stack/index.html)
//! 5. [Network interfaces](nic/index.html)
//! 6. Internals
//!    1. [The storage module](storage/index.html)
//!    2. [The managed module](managed/index.html)
//!
//! ## Design
//!
//! The stack speaks Ethernet II, ARP, IPv4 (with send-side fragmentation), ICMP echo and
//! destination-unreachable, and UDP. It is strictly polling driven: the caller repeatedly invokes
//! [`Stack::poll`] which performs exactly one non-blocking receive attempt on the device and runs
//! all resulting processing, including any answers, to completion before returning.
//!
//! All mutable protocol state lives in one explicit [`Stack`] value. There are no globals, so any
//! number of independent stacks may exist side by side, which the tests make heavy use of.
//!
//! Packets travel through the layers in a [`PacketBuffer`], a fixed region with a movable data
//! window. Headers are pushed in front of and popped from the window without copying payload.
//!
//! [`Stack::poll`]: stack/struct.Stack.html#method.poll
//! [`Stack`]: stack/struct.Stack.html
//! [`PacketBuffer`]: storage/struct.PacketBuffer.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

extern crate alloc;

#[macro_use] mod macros;

pub mod config;
pub mod layer;
pub mod managed;
pub mod nic;
pub mod stack;
pub mod storage;
pub mod time;
pub mod wire;

pub use crate::config::Config;
pub use crate::stack::Stack;
