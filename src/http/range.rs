//! HTTP Range header parsing module
//!
//! Single byte-range requests (RFC 7233 `bytes` unit). Parsing is split from
//! resolution: the grammar is checked without knowing the file size, then the
//! parsed spec is resolved against the size of the file actually opened.

use thiserror::Error;

/// Range failure, before or after resolution against a size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Header does not match `bytes=<digits?>-<digits?>`
    #[error("malformed range")]
    Malformed,
    /// Well-formed, but selects nothing inside a resource of `size` bytes
    #[error("range not satisfiable for {size} bytes")]
    NotSatisfiable { size: u64 },
}

/// Parsed Range request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=start-end`, `bytes=start-` or `bytes=-` (start defaults to 0)
    Bounded { start: u64, end: Option<u64> },
    /// `bytes=-n`: the last `n` bytes
    Suffix(u64),
}

/// Inclusive byte window inside a resource, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteWindow {
    pub start: u64,
    pub end: u64,
}

impl ByteWindow {
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{size}", self.start, self.end)
    }
}

impl RangeSpec {
    /// Resolve against the file size.
    ///
    /// An `end` past the last byte is clamped to `size - 1`. A start at or past
    /// `size`, a start after the end, an empty suffix, or any range on an
    /// empty resource is not satisfiable.
    pub const fn resolve(self, size: u64) -> Result<ByteWindow, RangeError> {
        if size == 0 {
            return Err(RangeError::NotSatisfiable { size });
        }
        let last = size - 1;

        match self {
            Self::Suffix(0) => Err(RangeError::NotSatisfiable { size }),
            Self::Suffix(n) => Ok(ByteWindow {
                start: size.saturating_sub(n),
                end: last,
            }),
            Self::Bounded { start, end } => {
                if start >= size {
                    return Err(RangeError::NotSatisfiable { size });
                }
                let end = match end {
                    Some(e) if start > e => return Err(RangeError::NotSatisfiable { size }),
                    Some(e) if e > last => last,
                    Some(e) => e,
                    None => last,
                };
                Ok(ByteWindow { start, end })
            }
        }
    }
}

/// Parse a Range header value (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
/// - `bytes=-` - Whole resource
///
/// Multiple ranges, other units and non-digit bounds are malformed.
///
/// # Examples
/// ```
/// use rangeserve::http::range::{parse_range_header, RangeSpec};
///
/// let spec = parse_range_header("bytes=0-99").unwrap();
/// assert_eq!(spec, RangeSpec::Bounded { start: 0, end: Some(99) });
///
/// assert!(parse_range_header("bytes=0-9,20-29").is_err());
/// ```
pub fn parse_range_header(value: &str) -> Result<RangeSpec, RangeError> {
    let value = value.trim();

    let Some((unit, set)) = value.split_once('=') else {
        return Err(RangeError::Malformed);
    };
    if !unit.trim_end().eq_ignore_ascii_case("bytes") {
        return Err(RangeError::Malformed);
    }

    let Some((start_str, end_str)) = set.trim_start().split_once('-') else {
        return Err(RangeError::Malformed);
    };

    let start = parse_bound(start_str)?;
    let end = parse_bound(end_str)?;

    match (start, end) {
        (None, Some(suffix)) => Ok(RangeSpec::Suffix(suffix)),
        (start, end) => Ok(RangeSpec::Bounded {
            start: start.unwrap_or(0),
            end,
        }),
    }
}

/// Parse one side of a range: empty, or ASCII digits only
fn parse_bound(s: &str) -> Result<Option<u64>, RangeError> {
    if s.is_empty() {
        return Ok(None);
    }
    // u64::from_str accepts a leading '+', the grammar does not
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::Malformed);
    }
    s.parse::<u64>().map(Some).map_err(|_| RangeError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(header: &str, size: u64) -> Result<ByteWindow, RangeError> {
        parse_range_header(header)?.resolve(size)
    }

    #[test]
    fn test_standard_range() {
        let w = window("bytes=0-9", 100).unwrap();
        assert_eq!(w, ByteWindow { start: 0, end: 9 });
        assert_eq!(w.len(), 10);
        assert_eq!(w.content_range(100), "bytes 0-9/100");
    }

    #[test]
    fn test_open_range() {
        let w = window("bytes=50-", 100).unwrap();
        assert_eq!(w, ByteWindow { start: 50, end: 99 });
        assert_eq!(w.len(), 50);
    }

    #[test]
    fn test_both_bounds_omitted_selects_everything() {
        assert_eq!(
            parse_range_header("bytes=-").unwrap(),
            RangeSpec::Bounded { start: 0, end: None }
        );
        assert_eq!(window("bytes=-", 100).unwrap(), ByteWindow { start: 0, end: 99 });
    }

    #[test]
    fn test_suffix_range() {
        assert_eq!(window("bytes=-20", 100).unwrap(), ByteWindow { start: 80, end: 99 });
        // Suffix longer than the file selects all of it
        assert_eq!(window("bytes=-500", 100).unwrap(), ByteWindow { start: 0, end: 99 });
        assert_eq!(
            window("bytes=-0", 100),
            Err(RangeError::NotSatisfiable { size: 100 })
        );
    }

    #[test]
    fn test_end_is_clamped() {
        let w = window("bytes=999999-1000000", 1_000_000).unwrap();
        assert_eq!(w, ByteWindow { start: 999_999, end: 999_999 });
        assert_eq!(w.content_range(1_000_000), "bytes 999999-999999/1000000");
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_not_satisfiable() {
        assert_eq!(
            window("bytes=200-", 100),
            Err(RangeError::NotSatisfiable { size: 100 })
        );
        // start == size is never satisfiable
        assert_eq!(
            window("bytes=100-150", 100),
            Err(RangeError::NotSatisfiable { size: 100 })
        );
        assert_eq!(
            window("bytes=50-10", 100),
            Err(RangeError::NotSatisfiable { size: 100 })
        );
        assert_eq!(
            window("bytes=0-0", 0),
            Err(RangeError::NotSatisfiable { size: 0 })
        );
        assert_eq!(
            window("bytes=-5", 0),
            Err(RangeError::NotSatisfiable { size: 0 })
        );
    }

    #[test]
    fn test_invalid_format() {
        for header in [
            "bytes=a-b",
            "bytes=0-9,20-29",
            "bytes=10",
            "bytes=+1-5",
            "bytes=1--5",
            "items=0-9",
            "0-9",
            "bytes 0-9",
            "bytes=99999999999999999999999-",
            "",
        ] {
            assert_eq!(
                parse_range_header(header),
                Err(RangeError::Malformed),
                "{header:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_lenient_unit_and_whitespace() {
        assert_eq!(
            parse_range_header("  Bytes=5-6 ").unwrap(),
            RangeSpec::Bounded { start: 5, end: Some(6) }
        );
    }
}
