//! Error types for gzchunk.

use std::fmt;

/// Errors that can occur while configuring or pulling from a chunk reader.
#[derive(Debug)]
pub enum ChunkError {
    /// A fatal I/O error occurred (open failure, missing object, ...).
    Io(std::io::Error),

    /// A transient I/O error persisted after every retry attempt.
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The error from the last attempt.
        source: std::io::Error,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The buffer filled up without containing a single delimiter.
    ///
    /// The longest record does not fit in the configured buffer.
    RecordTooLarge {
        /// The buffer capacity in bytes.
        capacity: usize,
    },

    /// A read was attempted before any source was bound.
    UnboundSource,

    /// A read was attempted after the reader finished.
    ReaderExhausted,

    /// The compressed input is malformed.
    CorruptStream {
        /// What was wrong with the stream.
        message: String,
    },
}

impl ChunkError {
    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        ChunkError::CorruptStream {
            message: message.into(),
        }
    }

    /// Returns true for configuration and sizing errors.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ChunkError::InvalidConfig { .. } | ChunkError::RecordTooLarge { .. }
        )
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::Io(e) => write!(f, "io error: {}", e),
            ChunkError::RetriesExhausted { attempts, source } => {
                write!(f, "io error after {} attempts: {}", attempts, source)
            }
            ChunkError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            ChunkError::RecordTooLarge { capacity } => write!(
                f,
                "no delimiter found within {} bytes; buffer is smaller than the longest record",
                capacity
            ),
            ChunkError::UnboundSource => {
                write!(f, "no source bound; bind a file before reading")
            }
            ChunkError::ReaderExhausted => {
                write!(f, "reader has finished; bind a new source to read again")
            }
            ChunkError::CorruptStream { message } => {
                write!(f, "corrupt gzip stream: {}", message)
            }
        }
    }
}

impl std::error::Error for ChunkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChunkError::Io(e) => Some(e),
            ChunkError::RetriesExhausted { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChunkError {
    fn from(e: std::io::Error) -> Self {
        ChunkError::Io(e)
    }
}
