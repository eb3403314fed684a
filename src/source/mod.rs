//! Raw byte sources.
//!
//! - [`ByteSource`] - "next raw block, or end of source"
//! - [`ReadSource`] / [`LocalSource`] - sequential reads from a file or any [`std::io::Read`]
//! - [`RemoteSource`] - sequential range reads through a [`RangeFetch`] backend
//! - [`SourceDescriptor`] - where a façade should read from
//!
//! Sources only move forward. Block reads that fail with a transient I/O
//! error are retried with backoff according to a [`RetryConfig`].

mod local;
mod remote;
mod retry;

#[cfg(feature = "object-store")]
mod cloud;

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::config::RetryConfig;
use crate::error::ChunkError;

pub use local::{LocalSource, ReadSource};
pub use remote::{RangeFetch, RemoteSource};

#[cfg(feature = "object-store")]
pub use cloud::ObjectStoreFetcher;

/// A forward-only supplier of raw (possibly compressed) bytes.
pub trait ByteSource {
    /// Returns the next block of at most `max_len` bytes.
    ///
    /// `Ok(None)` marks the end of the source. Once returned, every later
    /// call returns `Ok(None)` again.
    fn next_block(&mut self, max_len: usize) -> Result<Option<Bytes>, ChunkError>;

    /// A short human-readable description of the source.
    fn describe(&self) -> String;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_block(&mut self, max_len: usize) -> Result<Option<Bytes>, ChunkError> {
        (**self).next_block(max_len)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Identifies where raw bytes come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceDescriptor {
    /// A file on local disk.
    Local(PathBuf),

    /// An object in an S3 bucket.
    #[cfg(feature = "object-store")]
    S3 {
        /// Bucket name.
        bucket: String,
        /// Object key.
        key: String,
        /// Region; taken from the environment when `None`.
        region: Option<String>,
    },
}

impl SourceDescriptor {
    /// Describes a local file.
    pub fn local(path: impl AsRef<Path>) -> Self {
        SourceDescriptor::Local(path.as_ref().to_path_buf())
    }

    /// Describes an S3 object.
    #[cfg(feature = "object-store")]
    pub fn s3(bucket: impl Into<String>, key: impl Into<String>, region: Option<&str>) -> Self {
        SourceDescriptor::S3 {
            bucket: bucket.into(),
            key: key.into(),
            region: region.map(str::to_string),
        }
    }

    /// Opens the source. Compression is detected later from the first block.
    pub(crate) fn open(
        &self,
        retry: &RetryConfig,
    ) -> Result<Box<dyn ByteSource + Send>, ChunkError> {
        match self {
            SourceDescriptor::Local(path) => Ok(Box::new(LocalSource::open(path, *retry)?)),
            #[cfg(feature = "object-store")]
            SourceDescriptor::S3 {
                bucket,
                key,
                region,
            } => {
                let fetcher = ObjectStoreFetcher::s3(bucket, key, region.as_deref())?;
                Ok(Box::new(RemoteSource::new(fetcher, *retry)?))
            }
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Local(path) => {
                write!(f, "local file at path: {}", path.display())
            }
            #[cfg(feature = "object-store")]
            SourceDescriptor::S3 {
                bucket,
                key,
                region,
            } => {
                write!(f, "S3 object in bucket: {}, key: {}", bucket, key)?;
                if let Some(region) = region {
                    write!(f, ", region: {}", region)?;
                }
                Ok(())
            }
        }
    }
}
