//! Chunk types.
//!
//! - [`Chunk`] - Line-aligned chunk with data, stream offset and index

mod data;

pub use data::Chunk;
