//! A stub nic whose frames come from an external source.
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::layer::Result;
use crate::time::{Duration, Instant};

use super::Device;

/// A scripted device.
///
/// Frames pushed by the user are handed out one per `recv`, every frame the stack sends is
/// recorded. The clock only moves when told to, which makes all timers deterministic.
#[derive(Clone, Debug, Default)]
pub struct External {
    /// Frames not yet received.
    to_recv: VecDeque<Vec<u8>>,

    /// Frames sent, in order.
    sent: Vec<Vec<u8>>,

    /// The timestamp reported to the stack.
    now: Instant,
}

impl External {
    /// A new device at time zero with no frames.
    pub fn new() -> Self {
        External::default()
    }

    /// Queue a frame to be received.
    pub fn push(&mut self, frame: impl Into<Vec<u8>>) {
        self.to_recv.push_back(frame.into());
    }

    /// Remaining number of frames to receive.
    pub fn to_recv(&self) -> usize {
        self.to_recv.len()
    }

    /// All frames sent so far.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Take the frames sent so far, clearing the record.
    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        core::mem::replace(&mut self.sent, Vec::new())
    }

    /// Update the timestamp of all future operations.
    pub fn set_current_time(&mut self, instant: Instant) {
        self.now = instant;
    }

    /// Advance the clock.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Device for External {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<Option<usize>> {
        Ok(self.to_recv
            .pop_front()
            .map(|frame| super::deliver(&frame, buffer)))
    }

    fn timestamp(&self) -> Instant {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted() {
        let mut nic = External::new();
        nic.push(vec![1, 2, 3]);
        nic.push(&[4u8, 5][..]);
        assert_eq!(nic.to_recv(), 2);

        let mut buffer = [0; 2];
        assert_eq!(nic.recv(&mut buffer), Ok(Some(2)));
        assert_eq!(buffer, [1, 2]);
        assert_eq!(nic.recv(&mut buffer), Ok(Some(2)));
        assert_eq!(buffer, [4, 5]);
        assert_eq!(nic.recv(&mut buffer), Ok(None));

        assert_eq!(nic.send(&[9, 9]), Ok(()));
        assert_eq!(nic.take_sent(), vec![vec![9, 9]]);
        assert!(nic.sent().is_empty());

        nic.advance(Duration::from_millis(1500));
        assert_eq!(nic.timestamp(), Instant::from_millis(1500));
    }
}
