//! The Chunk type - a run of whole records from the decompressed stream.

use bytes::Bytes;
use std::fmt;

/// A line-aligned chunk with its position in the decompressed stream.
///
/// Every chunk except possibly the last one of a stream ends with the
/// delimiter byte.
///
/// # Example
///
/// ```
/// use gzchunk::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk {
///     data: Bytes::from_static(b"a,1\nb,2\n"),
///     offset: 0,
///     index: 0,
/// };
///
/// assert_eq!(chunk.len(), 8);
/// assert!(chunk.ends_with(b'\n'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk bytes.
    pub data: Bytes,

    /// Offset of the first byte in the decompressed stream.
    pub offset: u64,

    /// Position of this chunk in emission order (0-based).
    pub index: u64,
}

impl Chunk {
    /// Creates a new chunk.
    pub fn new(data: impl Into<Bytes>, offset: u64, index: u64) -> Self {
        Self {
            data: data.into(),
            offset,
            index,
        }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the chunk data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns true if the last byte is `delimiter`.
    pub fn ends_with(&self, delimiter: u8) -> bool {
        self.data.last() == Some(&delimiter)
    }

    /// Returns the number of records, counting an unterminated tail as one.
    pub fn record_count(&self, delimiter: u8) -> usize {
        let terminated = memchr::memchr_iter(delimiter, &self.data).count();
        if self.is_empty() || self.ends_with(delimiter) {
            terminated
        } else {
            terminated + 1
        }
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of the decompressed stream.
    pub fn range(&self) -> std::ops::Range<u64> {
        self.offset..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chunk #{}({} bytes @ {})",
            self.index,
            self.len(),
            self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let chunk = Chunk::new(&b"hello\n"[..], 0, 0);
        assert_eq!(chunk.len(), 6);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_empty() {
        let chunk = Chunk::new(&b""[..], 0, 0);
        assert!(chunk.is_empty());
        assert!(!chunk.ends_with(b'\n'));
        assert_eq!(chunk.record_count(b'\n'), 0);
    }

    #[test]
    fn test_record_count() {
        assert_eq!(Chunk::new(&b"a\nb\n"[..], 0, 0).record_count(b'\n'), 2);
        assert_eq!(Chunk::new(&b"a\nb"[..], 0, 0).record_count(b'\n'), 2);
        assert_eq!(Chunk::new(&b"abc"[..], 0, 0).record_count(b'\n'), 1);
    }

    #[test]
    fn test_range() {
        let chunk = Chunk::new(&b"hello"[..], 100, 3);
        assert_eq!(chunk.end(), 105);
        assert_eq!(chunk.range(), 100..105);
    }

    #[test]
    fn test_display() {
        let chunk = Chunk::new(&b"hello"[..], 100, 2);
        let s = format!("{}", chunk);
        assert!(s.contains("#2"));
        assert!(s.contains("5 bytes"));
        assert!(s.contains("@ 100"));
    }
}
