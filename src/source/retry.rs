//! Bounded retry with exponential backoff for block reads.

use std::io;
use std::thread;

use log::warn;

use crate::config::RetryConfig;
use crate::error::ChunkError;

/// Returns true for I/O errors that are worth another attempt.
pub(crate) fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
            | io::ErrorKind::Other
    )
}

/// Runs `op` until it succeeds, fails fatally, or the attempts run out.
pub(crate) fn with_retry<T>(
    policy: &RetryConfig,
    what: &str,
    mut op: impl FnMut() -> io::Result<T>,
) -> Result<T, ChunkError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if !is_transient(&e) => return Err(ChunkError::Io(e)),
            Err(e) if attempt >= policy.max_attempts() => {
                return Err(ChunkError::RetriesExhausted {
                    attempts: attempt,
                    source: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff_after(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}",
                    what,
                    attempt,
                    policy.max_attempts(),
                    e,
                    delay
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_policy(attempts: u32) -> RetryConfig {
        RetryConfig::new(attempts, Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let value = with_retry(&fast_policy(3), "test", || {
            calls += 1;
            if calls < 3 {
                Err(io::Error::new(io::ErrorKind::TimedOut, "slow"))
            } else {
                Ok(42)
            }
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut calls = 0;
        let err = with_retry(&fast_policy(3), "test", || -> io::Result<()> {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        })
        .unwrap_err();
        assert_eq!(calls, 3);
        assert!(matches!(err, ChunkError::RetriesExhausted { attempts: 3, .. }));
    }

    #[test]
    fn test_fatal_errors_are_not_retried() {
        let mut calls = 0;
        let err = with_retry(&fast_policy(5), "test", || -> io::Result<()> {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
        })
        .unwrap_err();
        assert_eq!(calls, 1);
        assert!(matches!(err, ChunkError::Io(_)));
    }

    #[test]
    fn test_classification() {
        assert!(is_transient(&io::Error::new(io::ErrorKind::Interrupted, "")));
        assert!(is_transient(&io::Error::other("network")));
        assert!(!is_transient(&io::Error::new(
            io::ErrorKind::PermissionDenied,
            ""
        )));
        assert!(!is_transient(&io::Error::new(io::ErrorKind::InvalidInput, "")));
    }
}
