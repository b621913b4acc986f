//! JSON Pointer (RFC 6901) utilities for patch paths.
//!
//! This crate implements the path syntax used by JSON Patch (RFC 6902):
//! parsing pointer strings into unescaped segments, formatting segments back
//! into pointer strings, normalizing builder input, and assembling pointers
//! segment by segment.
//!
//! # Example
//!
//! ```
//! use graft_json_pointer::{ParsedPath, format_pointer};
//!
//! let path = ParsedPath::parse("/foo/a~1b").unwrap();
//! assert_eq!(path.segments(), ["foo", "a/b"]);
//! assert_eq!(path.last_segment(), Some("a/b"));
//! assert_eq!(format_pointer(path.segments()), "/foo/a~1b");
//! ```

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("the provided string '{0}' is an invalid path")]
    InvalidPath(String),
}

/// Unescapes a pointer segment.
///
/// Per RFC 6901, `~1` decodes to `/` and `~0` decodes to `~`.
///
/// # Example
///
/// ```
/// use graft_json_pointer::unescape_segment;
///
/// assert_eq!(unescape_segment("a~0b"), "a~b");
/// assert_eq!(unescape_segment("c~1d"), "c/d");
/// assert_eq!(unescape_segment("plain"), "plain");
/// ```
pub fn unescape_segment(segment: &str) -> String {
    if !segment.contains('~') {
        return segment.to_string();
    }
    // Order matters: ~1 must be decoded before ~0
    segment.replace("~1", "/").replace("~0", "~")
}

/// Escapes a pointer segment.
///
/// Per RFC 6901, `~` encodes as `~0` and `/` encodes as `~1`.
///
/// # Example
///
/// ```
/// use graft_json_pointer::escape_segment;
///
/// assert_eq!(escape_segment("a~b"), "a~0b");
/// assert_eq!(escape_segment("c/d"), "c~1d");
/// ```
pub fn escape_segment(segment: &str) -> String {
    if !segment.contains('/') && !segment.contains('~') {
        return segment.to_string();
    }
    // Order matters: ~ must be encoded before /
    segment.replace('~', "~0").replace('/', "~1")
}

/// Format segments into a pointer string.
///
/// Returns an empty string for the root (no segments).
pub fn format_pointer<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(&escape_segment(segment.as_ref()));
    }
    out
}

/// Normalize a builder-supplied path.
///
/// Catches the most common path mistakes at document-build time rather than
/// at apply time: an empty segment (`//`) is rejected, and a missing leading
/// `/` is prefixed.
///
/// # Example
///
/// ```
/// use graft_json_pointer::normalize_path;
///
/// assert_eq!(normalize_path("a/b").unwrap(), "/a/b");
/// assert_eq!(normalize_path("/a/b").unwrap(), "/a/b");
/// assert!(normalize_path("/a//b").is_err());
/// ```
pub fn normalize_path(path: &str) -> Result<String, PointerError> {
    if path.contains("//") {
        return Err(PointerError::InvalidPath(path.to_string()));
    }
    if !path.starts_with('/') {
        let mut out = String::with_capacity(path.len() + 1);
        out.push('/');
        out.push_str(path);
        return Ok(out);
    }
    Ok(path.to_string())
}

/// A parsed patch path: the ordered, unescaped segments of a JSON Pointer.
///
/// Parsing decodes `~0`/`~1` escapes and collapses separators that would
/// produce empty segments, so `"/a//b/"` parses to `["a", "b"]`. The final
/// segment addresses the member an operation acts on; everything before it
/// locates the member's parent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedPath {
    segments: Vec<String>,
}

impl ParsedPath {
    /// Parse a pointer string into segments.
    ///
    /// # Errors
    ///
    /// Returns [`PointerError::InvalidPath`] when an escape introducer `~`
    /// is followed by anything other than `0` or `1`, or ends the string.
    ///
    /// # Example
    ///
    /// ```
    /// use graft_json_pointer::ParsedPath;
    ///
    /// let path = ParsedPath::parse("/a~0b/c~1d/0").unwrap();
    /// assert_eq!(path.segments(), ["a~b", "c/d", "0"]);
    ///
    /// assert!(ParsedPath::parse("/bad~2escape").is_err());
    /// assert!(ParsedPath::parse("/trailing~").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self, PointerError> {
        let mut segments = Vec::new();
        let mut buf = String::new();

        let mut chars = path.chars();
        while let Some(c) = chars.next() {
            match c {
                // A separator at a buffer-empty position is a no-op, not an
                // empty segment.
                '/' if buf.is_empty() => continue,
                '/' => segments.push(std::mem::take(&mut buf)),
                '~' => match chars.next() {
                    Some('0') => buf.push('~'),
                    Some('1') => buf.push('/'),
                    _ => return Err(PointerError::InvalidPath(path.to_string())),
                },
                other => buf.push(other),
            }
        }

        if !buf.is_empty() {
            segments.push(buf);
        }

        Ok(Self { segments })
    }

    /// Build a path directly from already-unescaped segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The unescaped segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, or `None` for the root path.
    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True when the path addresses the root (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Re-encode the path as a pointer string.
    pub fn to_pointer(&self) -> String {
        format_pointer(&self.segments)
    }
}

/// Assembles a normalized pointer string segment by segment.
///
/// This is the builder-API counterpart to writing pointer literals by hand:
/// keys are escaped, indices are rendered in decimal, and
/// [`end_of_sequence`](PointerBuilder::end_of_sequence) appends the `-`
/// marker.
///
/// # Example
///
/// ```
/// use graft_json_pointer::PointerBuilder;
///
/// let pointer = PointerBuilder::new()
///     .key("orders")
///     .index(2)
///     .key("a/b")
///     .build();
/// assert_eq!(pointer, "/orders/2/a~1b");
///
/// let tail = PointerBuilder::new().key("tags").end_of_sequence().build();
/// assert_eq!(tail, "/tags/-");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PointerBuilder {
    out: String,
}

impl PointerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object key or record member name.
    pub fn key(mut self, key: &str) -> Self {
        self.out.push('/');
        self.out.push_str(&escape_segment(key));
        self
    }

    /// Append a sequence index.
    pub fn index(mut self, index: usize) -> Self {
        self.out.push('/');
        self.out.push_str(&index.to_string());
        self
    }

    /// Append the `-` end-of-sequence marker.
    pub fn end_of_sequence(mut self) -> Self {
        self.out.push_str("/-");
        self
    }

    /// Finish and return the pointer string.
    pub fn build(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_root_and_separator_only() {
        assert_eq!(ParsedPath::parse("").unwrap().segments(), [] as [&str; 0]);
        assert_eq!(ParsedPath::parse("/").unwrap().segments(), [] as [&str; 0]);
        assert_eq!(ParsedPath::parse("///").unwrap().segments(), [] as [&str; 0]);
    }

    #[test]
    fn parse_simple_segments() {
        let path = ParsedPath::parse("/foo/bar").unwrap();
        assert_eq!(path.segments(), ["foo", "bar"]);
        assert_eq!(path.last_segment(), Some("bar"));
    }

    #[test]
    fn parse_collapses_empty_segments() {
        assert_eq!(ParsedPath::parse("/a//b").unwrap().segments(), ["a", "b"]);
        assert_eq!(ParsedPath::parse("a/b/").unwrap().segments(), ["a", "b"]);
        assert_eq!(ParsedPath::parse("//x").unwrap().segments(), ["x"]);
    }

    #[test]
    fn parse_decodes_escapes() {
        let path = ParsedPath::parse("/a~0b/c~1d").unwrap();
        assert_eq!(path.segments(), ["a~b", "c/d"]);

        // An escaped separator does not split the segment
        let path = ParsedPath::parse("/~1").unwrap();
        assert_eq!(path.segments(), ["/"]);
    }

    #[test]
    fn parse_rejects_bad_escapes() {
        assert_eq!(
            ParsedPath::parse("/a~2b"),
            Err(PointerError::InvalidPath("/a~2b".to_string()))
        );
        assert_eq!(
            ParsedPath::parse("/a~"),
            Err(PointerError::InvalidPath("/a~".to_string()))
        );
    }

    #[test]
    fn escape_unescape_are_inverses() {
        for raw in ["plain", "a~b", "c/d", "a~b/c", "~~", "//"] {
            assert_eq!(unescape_segment(&escape_segment(raw)), raw);
        }
    }

    #[test]
    fn format_roundtrip() {
        for pointer in ["", "/foo", "/foo/bar", "/a~0b/c~1d", "/arr/0", "/~0/~1"] {
            let path = ParsedPath::parse(pointer).unwrap();
            assert_eq!(path.to_pointer(), pointer);
        }
    }

    #[test]
    fn normalize_prefixes_and_rejects() {
        assert_eq!(normalize_path("a/b").unwrap(), "/a/b");
        assert_eq!(normalize_path("/a/b").unwrap(), "/a/b");
        assert_eq!(normalize_path("").unwrap(), "/");
        assert!(normalize_path("a//b").is_err());
    }

    #[test]
    fn builder_escapes_and_appends() {
        let pointer = PointerBuilder::new().key("a~b").index(0).build();
        assert_eq!(pointer, "/a~0b/0");

        let path = ParsedPath::parse(&pointer).unwrap();
        assert_eq!(path.segments(), ["a~b", "0"]);
    }

    #[test]
    fn from_segments_matches_parse() {
        let built = ParsedPath::from_segments(["foo", "a/b"]);
        let parsed = ParsedPath::parse("/foo/a~1b").unwrap();
        assert_eq!(built, parsed);
    }
}
