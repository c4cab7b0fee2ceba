//! Implementation of a software loop-back device.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::layer::{Error, Result};
use crate::time::Instant;

use super::Device;

/// A software loop-back device.
///
/// Maintains a bounded queue of frames in flight. Every sent frame is received again, in order.
#[derive(Clone, Debug)]
pub struct Loopback {
    in_flight: VecDeque<Vec<u8>>,
    limit: usize,
    now: Instant,
}

impl Loopback {
    /// Create a loop-back device holding at most `limit` frames in flight.
    pub fn new(limit: usize) -> Self {
        Loopback {
            in_flight: VecDeque::with_capacity(limit),
            limit,
            now: Instant::default(),
        }
    }

    /// Number of frames sent but not yet received.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Update the timestamp of all future operations.
    pub fn set_current_time(&mut self, instant: Instant) {
        self.now = instant;
    }
}

impl Device for Loopback {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        if self.in_flight.len() >= self.limit {
            return Err(Error::Exhausted);
        }

        self.in_flight.push_back(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        Ok(self.in_flight
            .pop_front()
            .map(|frame| super::deliver(&frame, buffer)))
    }

    fn timestamp(&self) -> Instant {
        self.now
    }
}
