//! [`RangeFetch`] backed by the `object_store` crate.
//!
//! Requires the `object-store` feature.

use std::io;
use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::ObjectStore;
use tokio::runtime::{Builder, Runtime};

use super::RangeFetch;
use crate::error::ChunkError;

/// Blocking range reads of one object in an [`ObjectStore`].
///
/// Each fetcher drives its own current-thread tokio runtime, so it can be
/// used from synchronous code. Do not call it from inside another runtime.
///
/// # Example
///
/// ```no_run
/// use gzchunk::{ObjectStoreFetcher, RemoteSource, RetryConfig};
///
/// let fetcher = ObjectStoreFetcher::s3("my-bucket", "exports/rows.csv.gz", Some("us-east-1"))?;
/// let source = RemoteSource::new(fetcher, RetryConfig::default())?;
/// println!("{} bytes", source.len());
/// # Ok::<(), gzchunk::ChunkError>(())
/// ```
pub struct ObjectStoreFetcher {
    store: Arc<dyn ObjectStore>,
    location: Path,
    runtime: Runtime,
    label: String,
}

impl ObjectStoreFetcher {
    /// Reads `key` from any object store.
    pub fn new(store: Arc<dyn ObjectStore>, key: &str) -> Result<Self, ChunkError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            label: format!("{} object {}", store, key),
            store,
            location: Path::from(key),
            runtime,
        })
    }

    /// Reads `key` from an S3 bucket.
    ///
    /// Credentials and other settings come from the `AWS_*` environment
    /// variables. `region` overrides `AWS_REGION` when given.
    pub fn s3(bucket: &str, key: &str, region: Option<&str>) -> Result<Self, ChunkError> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        let store = builder.build().map_err(into_io)?;
        Self::new(Arc::new(store), key)
    }
}

impl RangeFetch for ObjectStoreFetcher {
    fn content_length(&mut self) -> io::Result<u64> {
        let meta = self
            .runtime
            .block_on(self.store.head(&self.location))
            .map_err(into_io)?;
        Ok(meta.size as u64)
    }

    fn fetch(&mut self, range: Range<u64>) -> io::Result<Bytes> {
        let start = usize::try_from(range.start).map_err(|_| out_of_range())?;
        let end = usize::try_from(range.end).map_err(|_| out_of_range())?;
        self.runtime
            .block_on(self.store.get_range(&self.location, start..end))
            .map_err(into_io)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

impl std::fmt::Debug for ObjectStoreFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreFetcher")
            .field("store", &self.store.to_string())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

fn out_of_range() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "range exceeds address space")
}

/// Maps store errors onto I/O kinds the retry layer understands.
fn into_io(err: object_store::Error) -> io::Error {
    let kind = match &err {
        object_store::Error::NotFound { .. } => io::ErrorKind::NotFound,
        object_store::Error::InvalidPath { .. }
        | object_store::Error::NotSupported { .. }
        | object_store::Error::UnknownConfigurationKey { .. } => io::ErrorKind::InvalidInput,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, err)
}
