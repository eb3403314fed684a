//! High-level façade - Chunker.
//!
//! [`Chunker`] couples a [`ReaderConfig`] with at most one bound
//! [`ChunkReader`]. Configure it with the builder methods, bind a source,
//! then pull chunks.
//!
//! # Example
//!
//! ```no_run
//! use gzchunk::{ChunkError, Chunker};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let mut chunker = Chunker::new()
//!         .with_buffer_size(4_000_000)
//!         .with_delimiter("\n")?
//!         .with_local_file("rows.csv.gz")?;
//!
//!     while !chunker.is_finished() {
//!         let chunk = chunker.read_one()?;
//!         println!("{} bytes", chunk.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use log::warn;

use super::engine::ChunkReader;
use super::iter::ChunkIter;
use crate::config::{ReaderConfig, RetryConfig};
use crate::decode::Compression;
use crate::error::ChunkError;
use crate::source::{ByteSource, SourceDescriptor};

/// Configures and drives a line-aligned chunk reader.
///
/// Configuration changes only affect sources bound afterwards. Binding a
/// second source replaces the current reader and its progress; prefer one
/// `Chunker` per source.
#[derive(Debug, Default)]
pub struct Chunker {
    config: ReaderConfig,
    reader: Option<ChunkReader>,
    description: Option<String>,
}

impl Chunker {
    /// Creates an unbound chunker with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the buffer size. Values below
    /// [`MIN_BUFFER_SIZE`](crate::MIN_BUFFER_SIZE) are raised to it.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.config = self.config.with_buffer_size(size);
        self
    }

    /// Sets the record delimiter.
    ///
    /// Returns error unless `delimiter` is exactly one byte.
    pub fn with_delimiter(mut self, delimiter: &str) -> Result<Self, ChunkError> {
        self.config = self.config.with_delimiter_str(delimiter)?;
        Ok(self)
    }

    /// Sets the retry policy used by sources bound afterwards.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.config = self.config.with_retry(retry);
        self
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds a local file and returns the chunker.
    pub fn with_local_file(mut self, path: impl AsRef<Path>) -> Result<Self, ChunkError> {
        self.bind(SourceDescriptor::local(path))?;
        Ok(self)
    }

    /// Binds an S3 object and returns the chunker.
    ///
    /// Credentials are read from the environment. The region is taken from
    /// the environment as well when `region` is `None`.
    #[cfg(feature = "object-store")]
    pub fn with_s3_file(
        mut self,
        bucket: &str,
        key: &str,
        region: Option<&str>,
    ) -> Result<Self, ChunkError> {
        self.bind(SourceDescriptor::s3(bucket, key, region))?;
        Ok(self)
    }

    /// Opens `descriptor`, detects its compression and binds a new reader.
    pub fn bind(&mut self, descriptor: SourceDescriptor) -> Result<(), ChunkError> {
        self.config.validate()?;
        let source = descriptor.open(self.config.retry())?;
        self.install(source, None, descriptor.to_string())
    }

    /// Binds a caller-supplied source with known compression.
    pub fn bind_source<S>(&mut self, source: S, compression: Compression) -> Result<(), ChunkError>
    where
        S: ByteSource + Send + 'static,
    {
        self.config.validate()?;
        let description = source.describe();
        self.install(Box::new(source), Some(compression), description)
    }

    fn install(
        &mut self,
        source: Box<dyn ByteSource + Send>,
        compression: Option<Compression>,
        description: String,
    ) -> Result<(), ChunkError> {
        let reader = ChunkReader::from_boxed(
            source,
            compression,
            self.config.buffer_size(),
            self.config.delimiter(),
        )?;

        if let Some(old) = self.description.as_deref() {
            warn!("replacing reader for {} with {}", old, description);
        }
        self.reader = Some(reader);
        self.description = Some(description);
        Ok(())
    }

    fn reader_mut(&mut self) -> Result<&mut ChunkReader, ChunkError> {
        self.reader.as_mut().ok_or(ChunkError::UnboundSource)
    }

    /// Reads the next line-aligned chunk.
    ///
    /// See [`ChunkReader::read_chunk`].
    pub fn read_one(&mut self) -> Result<Bytes, ChunkError> {
        self.reader_mut()?.read_chunk()
    }

    /// Reads one unaligned buffer's worth and finishes.
    ///
    /// See [`ChunkReader::read_full`].
    pub fn read_full(&mut self) -> Result<Bytes, ChunkError> {
        self.reader_mut()?.read_full()
    }

    /// Returns an iterator over the remaining chunks.
    pub fn chunks(&mut self) -> Result<ChunkIter<'_>, ChunkError> {
        Ok(self.reader_mut()?.chunks())
    }

    /// The configuration applied to the next bind.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the bound reader, if any.
    pub fn reader(&self) -> Option<&ChunkReader> {
        self.reader.as_ref()
    }

    /// Returns true if a source is bound.
    pub fn is_bound(&self) -> bool {
        self.reader.is_some()
    }

    /// Returns true if the bound reader is finished. False when unbound.
    pub fn is_finished(&self) -> bool {
        self.reader.as_ref().is_some_and(ChunkReader::is_finished)
    }

    /// Returns true if the bound reader has started. False when unbound.
    pub fn has_started(&self) -> bool {
        self.reader.as_ref().is_some_and(ChunkReader::has_started)
    }

    /// Chunks emitted by the bound reader. Zero when unbound.
    pub fn n_reads(&self) -> u64 {
        self.reader.as_ref().map_or(0, ChunkReader::n_reads)
    }

    /// Bytes decompressed by the bound reader. Zero when unbound.
    pub fn bytes_decompressed(&self) -> u64 {
        self.reader.as_ref().map_or(0, ChunkReader::bytes_decompressed)
    }

    /// Description of the bound source.
    pub fn source_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// One-line progress report.
    pub fn status(&self) -> String {
        match &self.reader {
            None => "Target file is not set yet. Bind a source first.".to_string(),
            Some(r) if r.is_finished() => format!(
                "Read process has finished. Total number of chunks read: {}.",
                r.n_reads()
            ),
            Some(r) if r.has_started() => format!(
                "Read process has started. {} chunks have been read.",
                r.n_reads()
            ),
            Some(_) => "Read process has not been started.".to_string(),
        }
    }
}

impl fmt::Display for Chunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gz File Chunker:")?;

        let (Some(reader), Some(description)) = (&self.reader, &self.description) else {
            return write!(f, "Target file not set.");
        };

        writeln!(
            f,
            "Allocated internal buffer size: {} bytes",
            reader.capacity()
        )?;
        writeln!(
            f,
            "Line change symbol: '{}'",
            std::ascii::escape_default(reader.delimiter())
        )?;
        writeln!(f, "{}", description)?;
        writeln!(f, "Read Status:")?;
        writeln!(f, "- # reads: {}", reader.n_reads())?;
        writeln!(f, "- Bytes decompressed: {}", reader.bytes_decompressed())?;
        write!(f, "- Job is finished: {}", reader.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_BUFFER_SIZE;
    use crate::source::ReadSource;
    use flate2::Compression as Level;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    fn gz_file(data: &[u8]) -> NamedTempFile {
        let mut encoder = GzEncoder::new(Vec::new(), Level::default());
        encoder.write_all(data).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&encoder.finish().unwrap()).unwrap();
        file
    }

    #[test]
    fn test_buffer_floor() {
        let chunker = Chunker::new().with_buffer_size(100);
        assert_eq!(chunker.config().buffer_size(), MIN_BUFFER_SIZE);

        let chunker = Chunker::new().with_buffer_size(5_000_000);
        assert_eq!(chunker.config().buffer_size(), 5_000_000);
    }

    #[test]
    fn test_multibyte_delimiter_rejected() {
        let err = Chunker::new().with_delimiter("\r\n").unwrap_err();
        assert!(matches!(err, ChunkError::InvalidConfig { .. }));
        assert!(Chunker::new().with_delimiter("").is_err());
        assert_eq!(
            Chunker::new().with_delimiter("|").unwrap().config().delimiter(),
            b'|'
        );
    }

    #[test]
    fn test_unbound() {
        let mut chunker = Chunker::new();
        assert!(matches!(chunker.read_one(), Err(ChunkError::UnboundSource)));
        assert!(matches!(chunker.read_full(), Err(ChunkError::UnboundSource)));
        assert!(chunker.chunks().is_err());

        assert!(!chunker.is_bound());
        assert!(!chunker.is_finished());
        assert!(!chunker.has_started());
        assert_eq!(chunker.n_reads(), 0);
        assert_eq!(chunker.bytes_decompressed(), 0);
        assert_eq!(chunker.to_string(), "Gz File Chunker:\nTarget file not set.");
        assert!(chunker.status().starts_with("Target file is not set"));
    }

    #[test]
    fn test_local_gzip_file() {
        let file = gz_file(b"a,1\nb,2\nc,3\n");
        let mut chunker = Chunker::new().with_local_file(file.path()).unwrap();
        assert_eq!(chunker.status(), "Read process has not been started.");

        assert_eq!(&chunker.read_one().unwrap()[..], b"a,1\nb,2\nc,3\n");
        assert_eq!(chunker.n_reads(), 1);
        assert!(chunker.is_finished());
        assert_eq!(
            chunker.status(),
            "Read process has finished. Total number of chunks read: 1."
        );
        assert!(matches!(chunker.read_one(), Err(ChunkError::ReaderExhausted)));
    }

    #[test]
    fn test_display_when_bound() {
        let file = gz_file(b"x\n");
        let chunker = Chunker::new().with_local_file(file.path()).unwrap();
        let text = chunker.to_string();

        assert!(text.starts_with("Gz File Chunker:\nAllocated internal buffer size: 1000000 bytes\n"));
        assert!(text.contains("Line change symbol: '\\n'\n"));
        assert!(text.contains("local file at path: "));
        assert!(text.ends_with("- # reads: 0\n- Bytes decompressed: 0\n- Job is finished: false"));
    }

    #[test]
    fn test_bind_source_and_rebind() {
        let mut chunker = Chunker::new().with_delimiter(";").unwrap();
        chunker
            .bind_source(ReadSource::new(Cursor::new(b"a;b;".to_vec())), Compression::Unknown)
            .unwrap();
        assert_eq!(&chunker.read_one().unwrap()[..], b"a;b;");
        assert!(chunker.has_started());

        chunker
            .bind_source(ReadSource::new(Cursor::new(b"c;".to_vec())), Compression::Unknown)
            .unwrap();
        assert!(!chunker.has_started());
        assert_eq!(chunker.n_reads(), 0);
        assert_eq!(&chunker.read_one().unwrap()[..], b"c;");
    }

    #[test]
    fn test_missing_file() {
        let err = Chunker::new()
            .with_local_file("/no/such/file.csv.gz")
            .unwrap_err();
        assert!(matches!(err, ChunkError::Io(_)));
    }

    #[test]
    fn test_chunks_through_facade() {
        let file = gz_file(b"1\n2\n3\n");
        let mut chunker = Chunker::new().with_local_file(file.path()).unwrap();
        let data: Vec<u8> = chunker
            .chunks()
            .unwrap()
            .map(|c| c.unwrap().into_data())
            .flat_map(|b| b.to_vec())
            .collect();
        assert_eq!(data, b"1\n2\n3\n");
        assert!(chunker.is_finished());
    }
}
