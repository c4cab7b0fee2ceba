//! The ICMPv4 layer.
//!
//! Answers echo requests, notes echo replies to our own requests, and provides the destination
//! unreachable notifications of the upper layers. None of these are ever retried.
mod endpoint;
#[cfg(test)]
mod tests;

pub use endpoint::{Endpoint, EchoReply, ping, unreachable};
