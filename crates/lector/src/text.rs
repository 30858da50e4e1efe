//! Byte-offset text positions
//!
//! Readers index input by zero-based UTF-8 byte offsets. One matching step
//! consumes one `char`; `TextSize` carries the offsets and lengths, and
//! `TextRange` a half-open span.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text size in bytes (UTF-8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TextSize(u32);

/// Text range representing a span of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TextRange {
    start: TextSize,
    end: TextSize,
}

impl TextSize {
    #[must_use]
    pub const fn from(offset: u32) -> Self {
        Self(offset)
    }

    #[must_use]
    pub const fn into(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Size of one scalar value, in bytes
    #[must_use]
    pub const fn of_char(c: char) -> Self {
        Self(c.len_utf8() as u32)
    }

    /// Size of a whole string, in bytes
    #[must_use]
    pub fn of_str(s: &str) -> Self {
        Self(u32::try_from(s.len()).unwrap_or(u32::MAX))
    }
}

impl std::ops::Add<Self> for TextSize {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign<Self> for TextSize {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub<Self> for TextSize {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TextRange {
    #[must_use]
    pub const fn new(start: TextSize, end: TextSize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn at(start: TextSize, len: TextSize) -> Self {
        Self::new(start, TextSize(start.0 + len.0))
    }

    #[must_use]
    pub const fn start(self) -> TextSize {
        self.start
    }

    #[must_use]
    pub const fn end(self) -> TextSize {
        self.end
    }

    #[must_use]
    pub const fn len(self) -> TextSize {
        TextSize(self.end.0 - self.start.0)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    #[must_use]
    pub const fn contains(self, offset: TextSize) -> bool {
        offset.0 >= self.start.0 && offset.0 < self.end.0
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

#[cfg(feature = "diagnostics")]
impl From<TextRange> for miette::SourceSpan {
    fn from(range: TextRange) -> Self {
        use miette::SourceOffset;
        Self::new(
            SourceOffset::from(range.start().as_usize()),
            range.len().as_usize(),
        )
    }
}

/// The scalar value starting at `pos`, or `None` at or past the end of input.
///
/// Also `None` when `pos` falls inside a multi-byte sequence; readers only
/// ever produce boundary offsets, so this can occur solely with a caller
/// supplied start position.
#[must_use]
pub(crate) fn char_at(input: &str, pos: TextSize) -> Option<char> {
    input.get(pos.as_usize()..).and_then(|rest| rest.chars().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_size_arithmetic() {
        let a = TextSize::from(10);
        let b = TextSize::from(4);
        assert_eq!((a + b).into(), 14);
        assert_eq!((a - b).into(), 6);
        let mut c = a;
        c += b;
        assert_eq!(c.into(), 14);
    }

    #[test]
    fn test_text_size_of_char() {
        assert_eq!(TextSize::of_char('a').into(), 1);
        assert_eq!(TextSize::of_char('é').into(), 2);
        assert_eq!(TextSize::of_char('€').into(), 3);
    }

    #[test]
    fn test_text_range_at() {
        let range = TextRange::at(TextSize::from(3), TextSize::from(2));
        assert_eq!(range.start(), TextSize::from(3));
        assert_eq!(range.end(), TextSize::from(5));
        assert_eq!(range.len(), TextSize::from(2));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_text_range_contains() {
        let range = TextRange::new(TextSize::from(2), TextSize::from(4));
        assert!(!range.contains(TextSize::from(1)));
        assert!(range.contains(TextSize::from(2)));
        assert!(range.contains(TextSize::from(3)));
        assert!(!range.contains(TextSize::from(4)));
    }

    #[test]
    fn test_char_at() {
        assert_eq!(char_at("abc", TextSize::from(1)), Some('b'));
        assert_eq!(char_at("abc", TextSize::from(3)), None);
        assert_eq!(char_at("é", TextSize::zero()), Some('é'));
        // inside a multi-byte sequence
        assert_eq!(char_at("é", TextSize::from(1)), None);
    }
}
