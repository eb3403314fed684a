//! Sequential range reads against remote objects.

use std::io;
use std::ops::Range;

use bytes::Bytes;
use log::{debug, trace};

use super::ByteSource;
use super::retry::with_retry;
use crate::config::RetryConfig;
use crate::error::ChunkError;

/// A backend that can read byte ranges of one remote object.
///
/// Errors are plain [`io::Error`]s; their [`io::ErrorKind`] decides whether
/// a [`RemoteSource`] retries them. `NotFound`, `PermissionDenied` and
/// `InvalidInput` are fatal; timeouts, resets and `Other` are retried.
pub trait RangeFetch {
    /// Total size of the object in bytes.
    fn content_length(&mut self) -> io::Result<u64>;

    /// Reads `range` of the object.
    fn fetch(&mut self, range: Range<u64>) -> io::Result<Bytes>;

    /// A short human-readable description of the object.
    fn describe(&self) -> String;
}

/// A [`ByteSource`] that walks a remote object front to back in range reads.
///
/// The object length is resolved once at construction. Each block is one
/// range request sized to the caller's `max_len`, retried with backoff on
/// transient failures.
#[derive(Debug)]
pub struct RemoteSource<F> {
    fetcher: F,
    retry: RetryConfig,
    length: u64,
    position: u64,
}

impl<F: RangeFetch> RemoteSource<F> {
    /// Resolves the object length and positions the source at its start.
    pub fn new(mut fetcher: F, retry: RetryConfig) -> Result<Self, ChunkError> {
        let what = fetcher.describe();
        let length = with_retry(&retry, &what, || fetcher.content_length())?;
        debug!("{}: {} bytes", what, length);

        Ok(Self {
            fetcher,
            retry,
            length,
            position: 0,
        })
    }

    /// Total object size in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Returns true if the object is empty.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Offset of the next byte to be fetched.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Consumes the source and returns the fetcher.
    pub fn into_inner(self) -> F {
        self.fetcher
    }

    fn fetch_with_retry(&mut self, range: Range<u64>) -> Result<Bytes, ChunkError> {
        let what = self.fetcher.describe();
        let expected = (range.end - range.start) as usize;
        let fetcher = &mut self.fetcher;

        let mut data = with_retry(&self.retry, &what, || {
            let data = fetcher.fetch(range.clone())?;
            if data.is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("empty response for bytes {}..{}", range.start, range.end),
                ));
            }
            Ok(data)
        })?;

        data.truncate(expected);
        Ok(data)
    }
}

impl<F: RangeFetch> ByteSource for RemoteSource<F> {
    fn next_block(&mut self, max_len: usize) -> Result<Option<Bytes>, ChunkError> {
        if self.position >= self.length {
            return Ok(None);
        }

        let end = self
            .position
            .saturating_add(max_len.max(1) as u64)
            .min(self.length);
        let data = self.fetch_with_retry(self.position..end)?;
        trace!(
            "{}: fetched bytes {}..{}",
            self.fetcher.describe(),
            self.position,
            self.position + data.len() as u64
        );

        self.position += data.len() as u64;
        Ok(Some(data))
    }

    fn describe(&self) -> String {
        self.fetcher.describe()
    }
}
