//! Sequential sources backed by [`std::io::Read`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use log::trace;

use super::ByteSource;
use super::retry::with_retry;
use crate::config::RetryConfig;
use crate::error::ChunkError;

/// A [`ByteSource`] over a local file.
pub type LocalSource = ReadSource<File>;

/// A [`ByteSource`] that reads blocks from any [`std::io::Read`].
///
/// Blocks are carved out of one reusable [`BytesMut`] allocation, which is
/// reclaimed once the caller drops the previous block.
///
/// # Example
///
/// ```
/// use gzchunk::{ByteSource, ReadSource};
/// use std::io::Cursor;
///
/// let mut source = ReadSource::new(Cursor::new(b"a\nb\n".to_vec()));
/// let block = source.next_block(1024)?.unwrap();
/// assert_eq!(&block[..], b"a\nb\n");
/// assert!(source.next_block(1024)?.is_none());
/// # Ok::<(), gzchunk::ChunkError>(())
/// ```
#[derive(Debug)]
pub struct ReadSource<R> {
    reader: R,
    scratch: BytesMut,
    retry: RetryConfig,
    label: String,
    exhausted: bool,
}

impl LocalSource {
    /// Opens `path` for sequential reading.
    pub fn open(path: impl AsRef<Path>, retry: RetryConfig) -> Result<Self, ChunkError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(ReadSource::new(file)
            .with_retry(retry)
            .with_label(format!("local file {}", path.display())))
    }
}

impl<R: Read> ReadSource<R> {
    /// Wraps a reader using the default retry policy.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            scratch: BytesMut::new(),
            retry: RetryConfig::default(),
            label: "reader".to_string(),
            exhausted: false,
        }
    }

    /// Sets the retry policy for interrupted or timed-out reads.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the description reported by [`ByteSource::describe`].
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Consumes the source and returns the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_block(&mut self, max_len: usize) -> Result<Option<Bytes>, ChunkError> {
        if self.exhausted {
            return Ok(None);
        }

        self.scratch.clear();
        self.scratch.resize(max_len.max(1), 0);
        let n = with_retry(&self.retry, &self.label, || {
            self.reader.read(&mut self.scratch[..])
        })?;

        if n == 0 {
            trace!("{}: end of source", self.label);
            self.exhausted = true;
            return Ok(None);
        }

        Ok(Some(self.scratch.split_to(n).freeze()))
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Write};
    use std::time::Duration;

    /// Fails with `Interrupted` on every odd call.
    struct Flaky {
        inner: Cursor<Vec<u8>>,
        calls: u32,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls % 2 == 1 {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_blocks_respect_max_len() {
        let mut source = ReadSource::new(Cursor::new(b"0123456789".to_vec()));
        assert_eq!(&source.next_block(4).unwrap().unwrap()[..], b"0123");
        assert_eq!(&source.next_block(4).unwrap().unwrap()[..], b"4567");
        assert_eq!(&source.next_block(4).unwrap().unwrap()[..], b"89");
        assert!(source.next_block(4).unwrap().is_none());
    }

    #[test]
    fn test_end_of_source_is_idempotent() {
        let mut source = ReadSource::new(Cursor::new(Vec::new()));
        for _ in 0..3 {
            assert!(source.next_block(16).unwrap().is_none());
        }
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let flaky = Flaky {
            inner: Cursor::new(b"abc".to_vec()),
            calls: 0,
        };
        let retry = RetryConfig::new(2, Duration::ZERO, Duration::ZERO);
        let mut source = ReadSource::new(flaky).with_retry(retry);
        assert_eq!(&source.next_block(8).unwrap().unwrap()[..], b"abc");
    }

    #[test]
    fn test_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"x,y\n1,2\n").unwrap();

        let mut source = LocalSource::open(file.path(), RetryConfig::default()).unwrap();
        assert!(source.describe().starts_with("local file"));
        assert_eq!(&source.next_block(1024).unwrap().unwrap()[..], b"x,y\n1,2\n");
        assert!(source.next_block(1024).unwrap().is_none());
    }
}
