//! Configuration for chunk readers.
//!
//! - [`ReaderConfig`] - Buffer size and record delimiter
//! - [`RetryConfig`] - Retry policy for transient I/O failures

use std::time::Duration;

use crate::error::ChunkError;

/// Smallest buffer a [`ReaderConfig`] will use (1 MB).
pub const MIN_BUFFER_SIZE: usize = 1_000_000;

/// Default buffer size (1 MB).
pub const DEFAULT_BUFFER_SIZE: usize = MIN_BUFFER_SIZE;

/// Default record delimiter.
pub const DEFAULT_DELIMITER: u8 = b'\n';

/// Default number of attempts for a single block read.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Default upper bound for the delay between retries.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Configuration for a chunk reader.
///
/// The buffer size is clamped to [`MIN_BUFFER_SIZE`]. Every emitted chunk
/// (except possibly the last) ends with the delimiter byte, so the buffer
/// must be larger than the longest record in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderConfig {
    buffer_size: usize,
    delimiter: u8,
    retry: RetryConfig,
}

impl ReaderConfig {
    /// Creates a new configuration.
    ///
    /// Returns error if `delimiter` is not exactly one byte.
    pub fn new(buffer_size: usize, delimiter: &str) -> Result<Self, ChunkError> {
        Ok(Self::default()
            .with_buffer_size(buffer_size)
            .with_delimiter(delimiter_byte(delimiter)?))
    }

    /// Sets the buffer size, raising it to [`MIN_BUFFER_SIZE`] if needed.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    /// Sets the delimiter byte.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the delimiter from a string holding exactly one byte.
    pub fn with_delimiter_str(self, delimiter: &str) -> Result<Self, ChunkError> {
        Ok(self.with_delimiter(delimiter_byte(delimiter)?))
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the effective buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns the delimiter byte.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Returns the retry policy.
    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Validates the current configuration.
    ///
    /// The buffer size cannot go below [`MIN_BUFFER_SIZE`], so only the
    /// retry policy is checked.
    pub fn validate(&self) -> Result<(), ChunkError> {
        self.retry.validate()
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            delimiter: DEFAULT_DELIMITER,
            retry: RetryConfig::default(),
        }
    }
}

fn delimiter_byte(delimiter: &str) -> Result<u8, ChunkError> {
    match delimiter.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ChunkError::InvalidConfig {
            message: "delimiter must be exactly one byte",
        }),
    }
}

/// Retry policy for transient I/O failures.
///
/// Only block reads are retried. Decompression and alignment errors are
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RetryConfig {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryConfig {
    /// Creates a retry policy.
    pub const fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
        }
    }

    /// A policy that tries once and never sleeps.
    pub const fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Sets the total number of attempts (first try included).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the upper bound for the delay between retries.
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Returns the total number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the first retry.
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Returns the upper bound for the delay between retries.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Returns the delay to wait after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_attempts == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "retry policy needs at least one attempt",
            });
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_INITIAL_BACKOFF,
            DEFAULT_MAX_BACKOFF,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_default() {
        let config = ReaderConfig::default();
        assert_eq!(config.buffer_size(), 1_000_000);
        assert_eq!(config.delimiter(), b'\n');
        assert_eq!(config.retry().max_attempts(), 3);
    }

    #[test]
    fn test_buffer_floor() {
        let config = ReaderConfig::default().with_buffer_size(100);
        assert_eq!(config.buffer_size(), MIN_BUFFER_SIZE);

        let config = ReaderConfig::default().with_buffer_size(4_000_000);
        assert_eq!(config.buffer_size(), 4_000_000);
    }

    #[test]
    fn test_new_with_delimiter() {
        let config = ReaderConfig::new(2_000_000, ";").unwrap();
        assert_eq!(config.buffer_size(), 2_000_000);
        assert_eq!(config.delimiter(), b';');
    }

    #[test]
    fn test_invalid_delimiter() {
        assert!(ReaderConfig::new(0, "").is_err());
        assert!(ReaderConfig::new(0, "\r\n").is_err());
        // One char, two bytes in UTF-8
        let err = ReaderConfig::new(0, "é").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_with_delimiter_str() {
        let config = ReaderConfig::default().with_delimiter_str("|").unwrap();
        assert_eq!(config.delimiter(), b'|');
        assert!(ReaderConfig::default().with_delimiter_str("||").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ReaderConfig::default().validate().is_ok());
        assert!(ReaderConfig::default().with_buffer_size(1).validate().is_ok());

        let retry = RetryConfig::default().with_max_attempts(0);
        let err = ReaderConfig::default().with_retry(retry).validate().unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff_after(1), Duration::from_millis(100));
        assert_eq!(retry.backoff_after(2), Duration::from_millis(200));
        assert_eq!(retry.backoff_after(3), Duration::from_millis(400));
        assert_eq!(retry.backoff_after(10), DEFAULT_MAX_BACKOFF);
        assert_eq!(retry.backoff_after(64), DEFAULT_MAX_BACKOFF);
    }

    #[test]
    fn test_no_retry() {
        let retry = RetryConfig::no_retry();
        assert_eq!(retry.max_attempts(), 1);
        assert_eq!(retry.backoff_after(1), Duration::ZERO);
    }
}
