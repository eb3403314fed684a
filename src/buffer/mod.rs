//! The reusable working buffer behind a chunk reader.
//!
//! The front of the buffer holds the carry-over from the previous chunk,
//! followed by freshly decompressed bytes. The allocation never grows past
//! its capacity. It is an implementation detail and not part of the public
//! API.

use bytes::Bytes;

/// Fixed-capacity byte buffer with an in-place carry-over region.
#[derive(Debug)]
pub(crate) struct ChunkBuffer {
    data: Vec<u8>,
    len: usize,
}

impl ChunkBuffer {
    /// Allocates a buffer of exactly `capacity` bytes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// The filled region.
    pub(crate) fn filled(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// The free region after the filled bytes.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Marks `n` bytes of the spare region as filled.
    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.data.len());
        self.len += n;
    }

    /// Copies out the first `len` bytes and moves the rest to the front.
    pub(crate) fn take_front(&mut self, len: usize) -> Bytes {
        debug_assert!(len <= self.len);
        let data = Bytes::copy_from_slice(&self.data[..len]);

        // Keep the carry-over
        if len < self.len {
            self.data.copy_within(len..self.len, 0);
        }
        self.len -= len;

        data
    }

    /// Copies out everything that is filled.
    pub(crate) fn take_all(&mut self) -> Bytes {
        self.take_front(self.len)
    }
}
