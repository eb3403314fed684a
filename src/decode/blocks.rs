//! [`BufRead`] view of a [`ByteSource`].

use std::io::{self, BufRead, Read};

use bytes::{Buf, Bytes, BytesMut};

use super::{Compression, GZIP_MAGIC};
use crate::error::ChunkError;
use crate::source::ByteSource;

/// Buffers one raw block at a time from a [`ByteSource`].
///
/// Source errors are passed through [`io::Error`] unchanged inside an
/// `Other` error, so the decoder layer can recover the [`ChunkError`].
pub(crate) struct BlockReader {
    source: Box<dyn ByteSource + Send>,
    block: Bytes,
    block_size: usize,
    done: bool,
    raw_bytes: u64,
}

impl BlockReader {
    pub(crate) fn new(source: Box<dyn ByteSource + Send>, block_size: usize) -> Self {
        Self {
            source,
            block: Bytes::new(),
            block_size: block_size.max(1),
            done: false,
            raw_bytes: 0,
        }
    }

    /// Classifies the source from its first two bytes without consuming them.
    pub(crate) fn sniff(&mut self) -> Result<Compression, ChunkError> {
        while self.block.len() < GZIP_MAGIC.len() && !self.done {
            match self.source.next_block(self.block_size)? {
                Some(next) if self.block.is_empty() => self.block = next,
                Some(next) => {
                    let mut joined = BytesMut::with_capacity(self.block.len() + next.len());
                    joined.extend_from_slice(&self.block);
                    joined.extend_from_slice(&next);
                    self.block = joined.freeze();
                }
                None => self.done = true,
            }
        }
        Ok(Compression::from_magic(&self.block))
    }

    /// Raw bytes handed to the decoder so far.
    pub(crate) fn raw_bytes(&self) -> u64 {
        self.raw_bytes
    }

    pub(crate) fn describe(&self) -> String {
        self.source.describe()
    }
}

impl BufRead for BlockReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        while self.block.is_empty() && !self.done {
            // Release the spent block so the source can reuse its allocation
            self.block = Bytes::new();
            match self.source.next_block(self.block_size) {
                Ok(Some(block)) => self.block = block,
                Ok(None) => self.done = true,
                Err(e) => return Err(io::Error::other(e)),
            }
        }
        Ok(&self.block)
    }

    fn consume(&mut self, amt: usize) {
        self.block.advance(amt);
        self.raw_bytes += amt as u64;
    }
}

impl Read for BlockReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct Blocks(VecDeque<Bytes>);

    impl ByteSource for Blocks {
        fn next_block(&mut self, _max_len: usize) -> Result<Option<Bytes>, ChunkError> {
            Ok(self.0.pop_front())
        }

        fn describe(&self) -> String {
            "blocks".to_string()
        }
    }

    struct Broken;

    impl ByteSource for Broken {
        fn next_block(&mut self, _max_len: usize) -> Result<Option<Bytes>, ChunkError> {
            Err(ChunkError::UnboundSource)
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn reader(parts: &[&'static [u8]]) -> BlockReader {
        let blocks = parts.iter().map(|p| Bytes::from_static(p)).collect();
        BlockReader::new(Box::new(Blocks(blocks)), 16)
    }

    #[test]
    fn test_sniff_joins_short_blocks() {
        let mut input = reader(&[&[0x1f], &[0x8b, 0x08], b"rest"]);
        assert_eq!(input.sniff().unwrap(), Compression::Gzip);

        let mut all = Vec::new();
        input.read_to_end(&mut all).unwrap();
        assert_eq!(all, [&[0x1f, 0x8b, 0x08][..], b"rest"].concat());
        assert_eq!(input.raw_bytes(), 7);
    }

    #[test]
    fn test_sniff_short_source() {
        let mut input = reader(&[b"a"]);
        assert_eq!(input.sniff().unwrap(), Compression::Unknown);
        assert!(reader(&[]).sniff().is_ok());
    }

    #[test]
    fn test_read_is_bounded_by_output() {
        let mut input = reader(&[b"abcdef"]);
        let mut out = [0u8; 4];
        assert_eq!(input.read(&mut out).unwrap(), 4);
        assert_eq!(&out, b"abcd");
        assert_eq!(input.read(&mut out).unwrap(), 2);
        assert_eq!(input.read(&mut out).unwrap(), 0);
    }

    #[test]
    fn test_source_error_is_wrapped() {
        let mut input = BlockReader::new(Box::new(Broken), 16);
        let err = input.fill_buf().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.get_ref().is_some_and(|e| e.is::<ChunkError>()));
    }
}
