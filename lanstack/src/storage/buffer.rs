use alloc::boxed::Box;
use alloc::vec;

use super::Error;

/// Room reserved in front of a freshly initialized window.
///
/// Enough for Ethernet, an IPv4 header with maximum options and UDP, rounded up.
pub const HEADER_ROOM: usize = 128;

/// Minimum room behind a window when the buffer is sized by [`PacketBuffer::new`].
///
/// Short frames are padded to the Ethernet minimum payload. The padding lands here.
///
/// [`PacketBuffer::new`]: struct.PacketBuffer.html#method.new
const TAIL_ROOM: usize = 46;

/// A fixed capacity byte region with a movable data window.
///
/// The window is described by an offset and a length and always satisfies
/// `offset + len <= capacity`. Bytes outside the window are not meaningful until claimed by
/// `add_header` or `add_padding`. All window operations are pointer arithmetic only, except for
/// zero-filling padding.
///
/// `Clone` is the deep copy: it duplicates the whole backing region together with the window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketBuffer {
    storage: Box<[u8]>,
    offset: usize,
    len: usize,
}

impl PacketBuffer {
    /// Create a buffer with the given total capacity and an empty window.
    pub fn with_capacity(capacity: usize) -> Self {
        PacketBuffer {
            storage: vec![0; capacity].into_boxed_slice(),
            offset: HEADER_ROOM.min(capacity),
            len: 0,
        }
    }

    /// Create a buffer with a window of `len` zeroed bytes.
    ///
    /// The buffer is sized such that all headers of the stack and the Ethernet minimum padding
    /// can be added without ever failing.
    pub fn new(len: usize) -> Self {
        let mut buffer = PacketBuffer::with_capacity(HEADER_ROOM + len + TAIL_ROOM);
        buffer.offset = HEADER_ROOM;
        buffer.len = len;
        buffer
    }

    /// Create a buffer whose window holds a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buffer = PacketBuffer::new(data.len());
        buffer.as_mut_slice().copy_from_slice(data);
        buffer
    }

    /// Reset the window to `len` bytes behind the reserved header room.
    ///
    /// The previous content of the window is not cleared.
    pub fn init(&mut self, len: usize) -> Result<(), Error> {
        match HEADER_ROOM.checked_add(len) {
            Some(end) if end <= self.capacity() => (),
            _ => return Err(Error::CapacityExceeded),
        }

        self.offset = HEADER_ROOM;
        self.len = len;
        Ok(())
    }

    /// Extend the window to the front by `n` bytes of header space.
    pub fn add_header(&mut self, n: usize) -> Result<(), Error> {
        if self.offset < n {
            return Err(Error::InsufficientHeaderRoom);
        }

        self.offset -= n;
        self.len += n;
        Ok(())
    }

    /// Shrink the window from the front, discarding `n` bytes.
    pub fn remove_header(&mut self, n: usize) -> Result<(), Error> {
        if self.len < n {
            return Err(Error::WindowTooShort);
        }

        self.offset += n;
        self.len -= n;
        Ok(())
    }

    /// Extend the window at the back by `n` zero bytes.
    pub fn add_padding(&mut self, n: usize) -> Result<(), Error> {
        if self.tailroom() < n {
            return Err(Error::CapacityExceeded);
        }

        let end = self.offset + self.len;
        for byte in &mut self.storage[end..end + n] {
            *byte = 0;
        }
        self.len += n;
        Ok(())
    }

    /// Shrink the window from the back by `n` bytes.
    pub fn remove_padding(&mut self, n: usize) -> Result<(), Error> {
        if self.len < n {
            return Err(Error::WindowTooShort);
        }

        self.len -= n;
        Ok(())
    }

    /// The bytes currently in the window.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    /// The bytes currently in the window, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..self.offset + self.len]
    }

    /// Length of the window.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity of the backing region.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Space in front of the window.
    pub fn headroom(&self) -> usize {
        self.offset
    }

    /// Space behind the window.
    pub fn tailroom(&self) -> usize {
        self.capacity() - self.offset - self.len
    }
}
