//! Incremental decompression.
//!
//! - [`Compression`] - What a source holds, detected from its leading bytes
//! - `Decompressor` - Pulls raw blocks and writes decompressed bytes into a caller slice
//!
//! gzip members are decoded by [`flate2::bufread::MultiGzDecoder`] reading
//! from a `BlockReader`, which holds one raw block of the source at a time.
//! Output is always written into a caller-provided slice, so a single call
//! never produces more than the free buffer space no matter how high the
//! compression ratio is.

mod blocks;

use std::fmt;
use std::io::{self, Read};

use flate2::bufread::MultiGzDecoder;

use crate::error::ChunkError;

pub(crate) use blocks::BlockReader;

/// The two leading bytes of every gzip member.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compression of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Unknown or no compression; bytes pass through unchanged.
    #[default]
    Unknown,
    /// gzip (RFC 1952).
    Gzip,
}

impl Compression {
    /// Classifies a source from its first bytes.
    pub fn from_magic(head: &[u8]) -> Self {
        if head.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::Unknown
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Unknown => write!(f, "uncompressed"),
            Compression::Gzip => write!(f, "gzip"),
        }
    }
}

/// Streaming transform from a source's raw blocks to decompressed bytes.
///
/// gzip input may hold several concatenated members; all are decoded in
/// order. Bytes after the last member must form another valid member, so
/// trailing padding (zeros, garbage) is reported as
/// [`ChunkError::CorruptStream`] rather than skipped.
pub(crate) struct Decompressor {
    inner: Inner,
}

enum Inner {
    Identity(BlockReader),
    Gzip(MultiGzDecoder<BlockReader>),
}

impl Decompressor {
    /// Wraps `input`. For gzip the first member header is parsed right away.
    pub(crate) fn new(input: BlockReader, compression: Compression) -> Self {
        let inner = match compression {
            Compression::Unknown => Inner::Identity(input),
            Compression::Gzip => Inner::Gzip(MultiGzDecoder::new(input)),
        };
        Self { inner }
    }

    pub(crate) fn compression(&self) -> Compression {
        match self.inner {
            Inner::Identity(_) => Compression::Unknown,
            Inner::Gzip(_) => Compression::Gzip,
        }
    }

    fn input(&self) -> &BlockReader {
        match &self.inner {
            Inner::Identity(input) => input,
            Inner::Gzip(decoder) => decoder.get_ref(),
        }
    }

    /// Raw bytes consumed from the source so far.
    pub(crate) fn raw_bytes(&self) -> u64 {
        self.input().raw_bytes()
    }

    pub(crate) fn describe(&self) -> String {
        self.input().describe()
    }

    /// Writes the next decompressed bytes into `output`.
    ///
    /// Returns `Ok(0)` only at the end of the stream. `output` must not be
    /// empty.
    pub(crate) fn read(&mut self, output: &mut [u8]) -> Result<usize, ChunkError> {
        debug_assert!(!output.is_empty());
        let result = match &mut self.inner {
            Inner::Identity(input) => input.read(output),
            Inner::Gzip(decoder) => decoder.read(output),
        };
        result.map_err(decode_error)
    }
}

impl fmt::Debug for Decompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decompressor")
            .field("compression", &self.compression())
            .field("raw_bytes", &self.raw_bytes())
            .finish()
    }
}

/// Recovers source errors and maps flate2 failures to `CorruptStream`.
fn decode_error(err: io::Error) -> ChunkError {
    let kind = err.kind();
    let err = match err.into_inner() {
        Some(inner) => match inner.downcast::<ChunkError>() {
            Ok(source_err) => return *source_err,
            Err(other) => io::Error::new(kind, other),
        },
        None => io::Error::from(kind),
    };

    match kind {
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
            ChunkError::corrupt(err.to_string())
        }
        io::ErrorKind::UnexpectedEof => {
            ChunkError::corrupt(format!("truncated stream ({})", err))
        }
        _ => ChunkError::Io(err),
    }
}
