//! Record boundary search.

/// Splits decompressed bytes at the last record delimiter.
///
/// Everything up to and including the rightmost delimiter is emitted. The
/// tail after it is a partial record that must be carried into the next
/// read.
///
/// # Example
///
/// ```
/// use gzchunk::LineAligner;
///
/// let aligner = LineAligner::new(b'\n');
/// let (emit, carry) = aligner.split(b"a,1\nb,2\nc,");
/// assert_eq!(emit, b"a,1\nb,2\n");
/// assert_eq!(carry, b"c,");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineAligner {
    delimiter: u8,
}

impl LineAligner {
    /// Creates an aligner for the given delimiter byte.
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Returns the delimiter byte.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Length of the emittable prefix, or `None` if `bytes` holds no delimiter.
    pub fn boundary(&self, bytes: &[u8]) -> Option<usize> {
        memchr::memrchr(self.delimiter, bytes).map(|i| i + 1)
    }

    /// Splits `bytes` into `(emit, carry)`.
    ///
    /// Without a delimiter `emit` is empty and `carry` is all of `bytes`.
    pub fn split<'a>(&self, bytes: &'a [u8]) -> (&'a [u8], &'a [u8]) {
        bytes.split_at(self.boundary(bytes).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_last_delimiter() {
        let aligner = LineAligner::new(b'\n');
        assert_eq!(aligner.split(b"aaa\nbb"), (&b"aaa\n"[..], &b"bb"[..]));
        assert_eq!(aligner.split(b"aaa\nbbb\n"), (&b"aaa\nbbb\n"[..], &b""[..]));
    }

    #[test]
    fn test_no_delimiter() {
        let aligner = LineAligner::new(b'\n');
        assert_eq!(aligner.boundary(b"abc"), None);
        assert_eq!(aligner.split(b"abc"), (&b""[..], &b"abc"[..]));
        assert_eq!(aligner.split(b""), (&b""[..], &b""[..]));
    }

    #[test]
    fn test_custom_delimiter() {
        let aligner = LineAligner::new(b'|');
        assert_eq!(aligner.delimiter(), b'|');
        assert_eq!(aligner.boundary(b"a|b|c\nd"), Some(4));
    }
}
