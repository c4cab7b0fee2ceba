//! Receiving and sending ARP messages.
//!
//! Restricted to Ethernet and IPv4. The endpoint keeps two tables: the neighbor cache mapping
//! protocol to hardware addresses, and a queue holding at most one outgoing packet per address
//! that is still being resolved. The short lifetime of a queue entry doubles as the interval
//! between repeated requests for an unresponsive address.
mod endpoint;

pub use endpoint::{Endpoint, Neighbor};
