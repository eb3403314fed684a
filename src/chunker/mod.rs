//! Line-aligned chunk reading.
//!
//! - [`LineAligner`] - Splits bytes at the last record delimiter
//! - [`ChunkReader`] - Bounded-memory engine with `read_chunk()`/`read_full()`
//! - [`ChunkIter`] - Iterator over a reader's remaining chunks
//! - [`Chunker`] - Configure, bind a source, read

mod align;
mod engine;
mod facade;
mod iter;

pub use align::LineAligner;
pub use engine::{ChunkReader, ReaderState};
pub use facade::Chunker;
pub use iter::ChunkIter;
