//! gzchunk
//!
//! Line-aligned, memory-bounded chunk reading over gzip streams.
//!
//! `gzchunk` turns an arbitrarily large, possibly gzip-compressed byte
//! source into a sequence of chunks that each end exactly at a record
//! boundary. It is meant to feed CSV or NDJSON parsers that want whole
//! records without decompressing the whole file up front.
//!
//! The crate:
//! - decompresses incrementally into one fixed-size buffer
//! - never splits a record across two chunks
//! - reads local files, or remote objects through ranged reads
//! - does NOT parse the records it returns
//! - does NOT seek or prefetch
//!
//! # Local files
//!
//! ```no_run
//! use gzchunk::{ChunkError, Chunker};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let mut chunker = Chunker::new()
//!         .with_buffer_size(8_000_000)
//!         .with_local_file("rows.csv.gz")?;
//!
//!     for chunk in chunker.chunks()? {
//!         let chunk = chunk?;
//!         println!("{} records", chunk.record_count(b'\n'));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Any source
//!
//! ```
//! use gzchunk::{ChunkReader, Compression, ReadSource};
//! use std::io::Cursor;
//!
//! let source = ReadSource::new(Cursor::new(b"id,name\n1,a\n2,b\n".to_vec()));
//! let mut reader = ChunkReader::new(source, Compression::Unknown, 10, b'\n')?;
//!
//! assert_eq!(&reader.read_chunk()?[..], b"id,name\n");
//! assert_eq!(&reader.read_chunk()?[..], b"1,a\n2,b\n");
//! # Ok::<(), gzchunk::ChunkError>(())
//! ```
//!
//! # S3 (feature = "object-store")
//!
//! ```ignore
//! use gzchunk::Chunker;
//!
//! let mut chunker = Chunker::new().with_s3_file("bucket", "exports/rows.csv.gz", None)?;
//! let first = chunker.read_one()?;
//! # Ok::<(), gzchunk::ChunkError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod decode;
mod error;
mod source;

mod buffer; // internal working buffer

//
// Public surface
//

pub use chunk::Chunk;
pub use chunker::{ChunkIter, ChunkReader, Chunker, LineAligner, ReaderState};
pub use config::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DELIMITER, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_BACKOFF, MIN_BUFFER_SIZE, ReaderConfig, RetryConfig,
};
pub use decode::{Compression, GZIP_MAGIC};
pub use error::ChunkError;
pub use source::{
    ByteSource, LocalSource, RangeFetch, ReadSource, RemoteSource, SourceDescriptor,
};

#[cfg(feature = "object-store")]
pub use source::ObjectStoreFetcher;
