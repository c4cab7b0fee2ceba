//! The IPv4 layer.
//!
//! Incoming datagrams are validated and stripped of their header, outgoing payloads are split into
//! fragments that fit the link MTU. Options of received headers are skipped, never interpreted.
//! There is no routing: every destination is expected on the local link, and datagrams for other
//! hosts are dropped instead of forwarded.
//!
//! Received fragments are not reassembled. Each one is handed upwards as if it were a complete
//! datagram.
mod endpoint;

pub use endpoint::{Controller, Endpoint, Received};
