//! Pull iterator over a [`ChunkReader`].

use std::iter::FusedIterator;

use super::engine::ChunkReader;
use crate::chunk::Chunk;
use crate::error::ChunkError;

/// An iterator that yields the remaining chunks of a [`ChunkReader`].
///
/// Empty final flushes are skipped. The first error is yielded once and
/// ends the iteration, since it leaves the reader finished.
///
/// # Example
///
/// ```
/// use gzchunk::{ChunkReader, Compression, ReadSource};
/// use std::io::Cursor;
///
/// let source = ReadSource::new(Cursor::new(b"a\nb\nc\n".to_vec()));
/// let mut reader = ChunkReader::new(source, Compression::Unknown, 4, b'\n')?;
///
/// let mut total = 0;
/// for chunk in reader.chunks() {
///     let chunk = chunk?;
///     total += chunk.record_count(b'\n');
/// }
/// assert_eq!(total, 3);
/// # Ok::<(), gzchunk::ChunkError>(())
/// ```
#[derive(Debug)]
pub struct ChunkIter<'a> {
    reader: &'a mut ChunkReader,
}

impl<'a> ChunkIter<'a> {
    pub(crate) fn new(reader: &'a mut ChunkReader) -> Self {
        Self { reader }
    }
}

impl Iterator for ChunkIter<'_> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_finished() {
            return None;
        }

        match self.reader.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for ChunkIter<'_> {}
