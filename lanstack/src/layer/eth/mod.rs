//! The Ethernet II layer.
//!
//! Frames are accepted regardless of their destination address, the link is treated as if it
//! only carried traffic for this host. Outgoing payloads shorter than the Ethernet minimum are
//! zero padded.
mod endpoint;

pub use endpoint::{Controller, Endpoint};
