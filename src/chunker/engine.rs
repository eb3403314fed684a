//! Core reading engine - ChunkReader.
//!
//! A [`ChunkReader`] owns one [`ByteSource`], one decoder and one
//! fixed-capacity buffer. Each pull fills the buffer (carry-over first,
//! then freshly decompressed bytes) until it is full or the stream ends,
//! and emits everything up to the last record delimiter:
//!
//! - `read_chunk()` - Next line-aligned chunk as [`Bytes`]
//! - `read_full()` - One unaligned buffer's worth, then finished
//! - `chunks()` - Iterator over [`Chunk`]s with offsets and indices
//!
//! # Example
//!
//! ```
//! use gzchunk::{ChunkReader, Compression, ReadSource};
//! use std::io::Cursor;
//!
//! let source = ReadSource::new(Cursor::new(b"aaa\nbbb\nccc".to_vec()));
//! let mut reader = ChunkReader::new(source, Compression::Unknown, 6, b'\n')?;
//!
//! assert_eq!(&reader.read_chunk()?[..], b"aaa\n");
//! assert_eq!(&reader.read_chunk()?[..], b"bbb\n");
//! assert_eq!(&reader.read_chunk()?[..], b"ccc");
//! assert!(reader.is_finished());
//! # Ok::<(), gzchunk::ChunkError>(())
//! ```

use std::fmt;

use bytes::Bytes;
use log::{debug, trace};

use super::align::LineAligner;
use super::iter::ChunkIter;
use crate::buffer::ChunkBuffer;
use crate::chunk::Chunk;
use crate::config::ReaderConfig;
use crate::decode::{BlockReader, Compression, Decompressor};
use crate::error::ChunkError;
use crate::source::ByteSource;

/// Lifecycle of a [`ChunkReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderState {
    /// Nothing has been pulled yet.
    NotStarted,
    /// At least one pull happened and the stream is not done.
    InProgress,
    /// The stream was fully emitted, or a pull failed.
    Finished,
}

impl fmt::Display for ReaderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderState::NotStarted => write!(f, "not started"),
            ReaderState::InProgress => write!(f, "in progress"),
            ReaderState::Finished => write!(f, "finished"),
        }
    }
}

/// A memory-bounded reader that yields line-aligned chunks.
///
/// Every chunk except possibly the last ends with the delimiter, and no
/// record is ever split across two chunks. Concatenating all chunks
/// reproduces the decompressed stream. Memory use is one buffer of
/// `capacity` bytes plus one raw block, however large the input is.
///
/// A record longer than the buffer cannot be aligned; the read fails with
/// [`ChunkError::RecordTooLarge`]. Any error leaves the reader finished,
/// and later pulls return [`ChunkError::ReaderExhausted`].
///
/// # Example
///
/// ```
/// use gzchunk::{ChunkReader, Compression, ReadSource};
/// use flate2::{write::GzEncoder, Compression as Level};
/// use std::io::{Cursor, Write};
///
/// let mut encoder = GzEncoder::new(Vec::new(), Level::default());
/// encoder.write_all(b"a,1\nb,2\nc,3\n")?;
/// let gz = encoder.finish()?;
///
/// let source = ReadSource::new(Cursor::new(gz));
/// let mut reader = ChunkReader::new(source, Compression::Gzip, 1 << 20, b'\n')?;
///
/// assert_eq!(&reader.read_chunk()?[..], b"a,1\nb,2\nc,3\n");
/// assert_eq!(reader.n_reads(), 1);
/// assert!(reader.is_finished());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ChunkReader {
    decoder: Decompressor,
    aligner: LineAligner,
    buffer: ChunkBuffer,
    stream_done: bool,
    state: ReaderState,
    n_reads: u64,
    bytes_decompressed: u64,
    bytes_emitted: u64,
}

impl ChunkReader {
    /// Creates a reader with an exact buffer capacity.
    ///
    /// Unlike [`ReaderConfig`], no minimum is enforced here. Returns error
    /// if `capacity` is zero.
    ///
    /// # Arguments
    ///
    /// * `source` - Where raw bytes come from
    /// * `compression` - How the raw bytes are compressed
    /// * `capacity` - Buffer size in bytes; bounds every chunk
    /// * `delimiter` - Record delimiter byte
    pub fn new<S>(
        source: S,
        compression: Compression,
        capacity: usize,
        delimiter: u8,
    ) -> Result<Self, ChunkError>
    where
        S: ByteSource + Send + 'static,
    {
        Self::from_boxed(Box::new(source), Some(compression), capacity, delimiter)
    }

    /// Creates a reader that detects compression from the source's first
    /// two bytes.
    ///
    /// The leading bytes are read once and kept for decoding, so the source
    /// is not opened or fetched twice.
    pub fn autodetect<S>(source: S, capacity: usize, delimiter: u8) -> Result<Self, ChunkError>
    where
        S: ByteSource + Send + 'static,
    {
        Self::from_boxed(Box::new(source), None, capacity, delimiter)
    }

    /// Creates a reader from a validated [`ReaderConfig`].
    pub fn with_config<S>(
        source: S,
        compression: Compression,
        config: &ReaderConfig,
    ) -> Result<Self, ChunkError>
    where
        S: ByteSource + Send + 'static,
    {
        config.validate()?;
        Self::new(source, compression, config.buffer_size(), config.delimiter())
    }

    /// `compression: None` sniffs the leading bytes.
    pub(crate) fn from_boxed(
        source: Box<dyn ByteSource + Send>,
        compression: Option<Compression>,
        capacity: usize,
        delimiter: u8,
    ) -> Result<Self, ChunkError> {
        if capacity == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "buffer capacity must be greater than zero",
            });
        }

        // Raw blocks are requested at buffer size
        let mut input = BlockReader::new(source, capacity);
        let compression = match compression {
            Some(compression) => compression,
            None => input.sniff()?,
        };

        debug!(
            "binding {} ({}, {} byte buffer)",
            input.describe(),
            compression,
            capacity
        );

        Ok(Self {
            decoder: Decompressor::new(input, compression),
            aligner: LineAligner::new(delimiter),
            buffer: ChunkBuffer::with_capacity(capacity),
            stream_done: false,
            state: ReaderState::NotStarted,
            n_reads: 0,
            bytes_decompressed: 0,
            bytes_emitted: 0,
        })
    }

    /// Reads the next line-aligned chunk.
    ///
    /// The final chunk holds whatever follows the last delimiter and may
    /// not end with one. If the stream ended exactly on a chunk boundary
    /// the final pull returns empty bytes, which is not counted as a read.
    ///
    /// # Errors
    ///
    /// - [`ChunkError::ReaderExhausted`] once the reader is finished
    /// - [`ChunkError::RecordTooLarge`] if a full buffer has no delimiter
    /// - [`ChunkError::CorruptStream`] for malformed gzip input
    /// - I/O errors from the source
    pub fn read_chunk(&mut self) -> Result<Bytes, ChunkError> {
        Ok(self
            .next_chunk()?
            .map(Chunk::into_data)
            .unwrap_or_default())
    }

    /// Reads up to one buffer's worth without alignment and finishes.
    ///
    /// Only meant for inputs known to fit in the buffer; anything beyond
    /// the first `capacity` decompressed bytes is never read.
    pub fn read_full(&mut self) -> Result<Bytes, ChunkError> {
        self.begin()?;

        let filled = self.fill();
        self.finish_reading();
        filled?;

        let data = self.buffer.take_all();
        if data.is_empty() {
            return Ok(data);
        }
        Ok(self.emit(data).into_data())
    }

    /// Returns an iterator over the remaining chunks.
    pub fn chunks(&mut self) -> ChunkIter<'_> {
        ChunkIter::new(self)
    }

    /// Pulls the next chunk. `Ok(None)` is the empty final flush.
    pub(crate) fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        self.begin()?;

        let result = self.pull();
        if result.is_err() {
            self.finish_reading();
        }
        result
    }

    fn begin(&mut self) -> Result<(), ChunkError> {
        match self.state {
            ReaderState::Finished => Err(ChunkError::ReaderExhausted),
            ReaderState::NotStarted => {
                trace!("{}: first read", self.decoder.describe());
                self.state = ReaderState::InProgress;
                Ok(())
            }
            ReaderState::InProgress => Ok(()),
        }
    }

    fn pull(&mut self) -> Result<Option<Chunk>, ChunkError> {
        self.fill()?;

        let mut boundary = None;
        if !self.stream_done {
            boundary = self.aligner.boundary(self.buffer.filled());
            // A full buffer without a delimiter is only valid as the last record
            if boundary.is_none() && self.at_end()? {
                self.stream_done = true;
            }
        }

        if self.stream_done {
            self.finish_reading();
            let rest = self.buffer.take_all();
            if rest.is_empty() {
                return Ok(None);
            }
            return Ok(Some(self.emit(rest)));
        }

        match boundary {
            Some(len) => {
                let data = self.buffer.take_front(len);
                Ok(Some(self.emit(data)))
            }
            None => Err(ChunkError::RecordTooLarge {
                capacity: self.buffer.capacity(),
            }),
        }
    }

    /// Fills the buffer until it is full or the stream has ended.
    fn fill(&mut self) -> Result<(), ChunkError> {
        while !self.buffer.is_full() && !self.stream_done {
            let n = self.decoder.read(self.buffer.spare_mut())?;
            if n == 0 {
                self.stream_done = true;
            } else {
                self.buffer.advance(n);
                self.bytes_decompressed += n as u64;
            }
        }
        Ok(())
    }

    /// Checks for end of stream with a full buffer.
    ///
    /// A byte read here belongs to a record that cannot fit, so it is only
    /// counted and the pull fails.
    fn at_end(&mut self) -> Result<bool, ChunkError> {
        let mut lookahead = [0u8; 1];
        let n = self.decoder.read(&mut lookahead)?;
        self.bytes_decompressed += n as u64;
        Ok(n == 0)
    }

    fn emit(&mut self, data: Bytes) -> Chunk {
        let chunk = Chunk::new(data, self.bytes_emitted, self.n_reads);
        self.bytes_emitted += chunk.len() as u64;
        self.n_reads += 1;
        trace!("emit {}", chunk);
        chunk
    }

    fn finish_reading(&mut self) {
        if self.state != ReaderState::Finished {
            debug!(
                "{}: finished after {} reads, {} bytes decompressed from {} raw",
                self.decoder.describe(),
                self.n_reads,
                self.bytes_decompressed,
                self.decoder.raw_bytes()
            );
        }
        self.state = ReaderState::Finished;
    }

    /// Returns true once no more chunks can be read.
    pub fn is_finished(&self) -> bool {
        self.state == ReaderState::Finished
    }

    /// Returns true once any read has been attempted.
    pub fn has_started(&self) -> bool {
        self.state != ReaderState::NotStarted
    }

    /// Number of non-empty chunks emitted so far.
    pub fn n_reads(&self) -> u64 {
        self.n_reads
    }

    /// Total bytes produced by the decoder, including pending carry-over.
    pub fn bytes_decompressed(&self) -> u64 {
        self.bytes_decompressed
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// The record delimiter.
    pub fn delimiter(&self) -> u8 {
        self.aligner.delimiter()
    }

    /// Compression of the bound source.
    pub fn compression(&self) -> Compression {
        self.decoder.compression()
    }

    /// Bytes carried over from the previous read.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Description of the bound source.
    pub fn source_description(&self) -> String {
        self.decoder.describe()
    }
}

impl fmt::Debug for ChunkReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkReader")
            .field("source", &self.decoder.describe())
            .field("decoder", &self.decoder)
            .field("capacity", &self.buffer.capacity())
            .field("delimiter", &self.aligner.delimiter())
            .field("state", &self.state)
            .field("n_reads", &self.n_reads)
            .field("bytes_decompressed", &self.bytes_decompressed)
            .finish()
    }
}
