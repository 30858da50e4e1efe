//! Primitive readers
//!
//! The leaf matchers every grammar bottoms out in: single units, literal
//! runs, character classes, any-unit, end-of-input, and the always-failing
//! reader for syntactically reachable but semantically invalid spots.

use super::{FailGen, Reader, ReaderNode};
use crate::error::GrammarError;
use crate::result::Failure;
use crate::text::TextSize;
use compact_str::CompactString;
use regex::Regex;
use std::sync::Arc;

pub(crate) fn char_label(expected: char) -> CompactString {
    compact_str::format_compact!("'{expected}'")
}

pub(crate) fn literal_label(text: &str) -> CompactString {
    compact_str::format_compact!("\"{text}\"")
}

/// Case-insensitive single-unit fold
pub(crate) fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(folded), None) => folded,
        _ => c,
    }
}

pub(crate) fn chars_match(read: char, expected: char, fold: bool) -> bool {
    if fold {
        fold_char(read) == fold_char(expected)
    } else {
        read == expected
    }
}

impl Reader {
    /// Match exactly one unit equal to `expected`.
    ///
    /// On success the token's value is the canonical `expected`, not the
    /// unit actually read; fails with the label `'c'`.
    #[must_use]
    pub fn char(expected: char) -> Self {
        Self::from_node(ReaderNode::Char {
            expected,
            fold: false,
        })
    }

    /// Match one unit equal to `expected` up to case folding.
    ///
    /// The canonical `expected` is returned even when the input differs in
    /// case; the consumed length is that of the unit actually read.
    #[must_use]
    pub fn char_insensitive(expected: char) -> Self {
        Self::from_node(ReaderNode::Char {
            expected,
            fold: true,
        })
    }

    /// Match the exact run of units in `text`.
    ///
    /// Fails with the single expectation `"text"` at the start position,
    /// not per-character.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::from_node(ReaderNode::Literal {
            text: text.into(),
            fold: false,
        })
    }

    /// Case-insensitive [`Reader::literal`]; returns the canonical `text`
    #[must_use]
    pub fn literal_insensitive(text: impl Into<String>) -> Self {
        Self::from_node(ReaderNode::Literal {
            text: text.into(),
            fold: true,
        })
    }

    /// Match one unit against `pattern`, anchored to a single unit.
    ///
    /// The failure label is the pattern text itself.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidCharClass`] when `pattern` is not a
    /// valid regular expression.
    pub fn char_class(pattern: &str) -> Result<Self, GrammarError> {
        let matcher = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|source| GrammarError::invalid_char_class(pattern, source))?;
        Ok(Self::from_node(ReaderNode::CharClass {
            pattern: CompactString::from(pattern),
            matcher,
        }))
    }

    /// Match any one remaining unit; fails at end of input
    #[must_use]
    pub fn any_char() -> Self {
        Self::from_node(ReaderNode::AnyChar)
    }

    /// Succeed (zero-length) iff the position is at or past the input end
    #[must_use]
    pub fn eof() -> Self {
        Self::from_node(ReaderNode::Eof)
    }

    /// Succeed with `Value::Null` and a zero-length span
    #[must_use]
    pub fn succeed() -> Self {
        Self::from_node(ReaderNode::Succeed)
    }

    /// Always fail with the given expectation label
    #[must_use]
    pub fn fail(label: impl Into<CompactString>) -> Self {
        Self::from_node(ReaderNode::Fail(FailGen::Label(label.into())))
    }

    /// Always fail, with a position-aware failure generator.
    ///
    /// Useful where an input is syntactically reachable but semantically
    /// invalid and the message should depend on what is actually there.
    #[must_use]
    pub fn fail_with(
        generate: impl Fn(&str, TextSize) -> Failure + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(ReaderNode::Fail(FailGen::Generate(Arc::new(generate))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Value;

    #[test]
    fn test_char_success_span() {
        let token = Reader::char('a').read("abc", TextSize::zero()).unwrap();
        assert_eq!(token.value, Value::Char('a'));
        assert_eq!(token.position, TextSize::zero());
        assert_eq!(token.length, TextSize::from(1));
        assert_eq!(token.next, TextSize::from(1));
        assert!(token.trailing.is_empty());
    }

    #[test]
    fn test_char_failure_label() {
        let failure = Reader::char('a').read("xyz", TextSize::zero()).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].expected, "'a'");
        assert_eq!(failure.errors[0].position, TextSize::zero());
    }

    #[test]
    fn test_char_insensitive_returns_canonical() {
        let token = Reader::char_insensitive('a')
            .read("Abc", TextSize::zero())
            .unwrap();
        assert_eq!(token.value, Value::Char('a'));
        assert_eq!(token.length, TextSize::from(1));
    }

    #[test]
    fn test_char_multibyte() {
        // "été" is é(2 bytes) t(1) é(2); the second é starts at offset 3
        let token = Reader::char('é').read("été", TextSize::from(3)).unwrap();
        assert_eq!(token.position, TextSize::from(3));
        assert_eq!(token.length, TextSize::from(2));
        assert_eq!(token.next, TextSize::from(5));
    }

    #[test]
    fn test_literal_single_expectation() {
        let reader = Reader::literal("null");
        let failure = reader.read("nuts", TextSize::zero()).unwrap_err();
        assert_eq!(failure.errors.len(), 1);
        assert_eq!(failure.errors[0].expected, "\"null\"");
        assert_eq!(failure.errors[0].position, TextSize::zero());

        let token = reader.read("null!", TextSize::zero()).unwrap();
        assert_eq!(token.value, Value::Str("null".into()));
        assert_eq!(token.next, TextSize::from(4));
    }

    #[test]
    fn test_literal_insensitive_canonical() {
        let token = Reader::literal_insensitive("true")
            .read("TRUE", TextSize::zero())
            .unwrap();
        assert_eq!(token.value, Value::Str("true".into()));
    }

    #[test]
    fn test_char_class() {
        let digit = Reader::char_class("[0-9]").unwrap();
        let token = digit.read("7x", TextSize::zero()).unwrap();
        assert_eq!(token.value, Value::Char('7'));

        let failure = digit.read("x7", TextSize::zero()).unwrap_err();
        assert_eq!(failure.errors[0].expected, "[0-9]");
    }

    #[test]
    fn test_char_class_invalid_pattern() {
        let err = Reader::char_class("[0-9").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidCharClass { .. }));
    }

    #[test]
    fn test_any_char() {
        let token = Reader::any_char().read("x", TextSize::zero()).unwrap();
        assert_eq!(token.value, Value::Char('x'));
        assert!(Reader::any_char().read("x", TextSize::from(1)).is_err());
    }

    #[test]
    fn test_eof() {
        let reader = Reader::eof();
        let token = reader.read("ab", TextSize::from(2)).unwrap();
        assert_eq!(token.length, TextSize::zero());
        assert_eq!(token.next, TextSize::from(2));
        // at or past the end both succeed
        assert!(reader.read("ab", TextSize::from(5)).is_ok());
        assert!(reader.read("ab", TextSize::zero()).is_err());
    }

    #[test]
    fn test_succeed() {
        let token = Reader::succeed().read("abc", TextSize::from(1)).unwrap();
        assert_eq!(token.value, Value::Null);
        assert_eq!(token.position, TextSize::from(1));
        assert_eq!(token.length, TextSize::zero());
        assert_eq!(token.next, TextSize::from(1));
    }

    #[test]
    fn test_fail() {
        let failure = Reader::fail("a vegetable")
            .read("carrot", TextSize::from(3))
            .unwrap_err();
        assert_eq!(failure.errors[0].expected, "a vegetable");
        assert_eq!(failure.errors[0].position, TextSize::from(3));
    }

    #[test]
    fn test_fail_with_generator() {
        let reader = Reader::fail_with(|input, pos| {
            Failure::expected(pos, format!("not {input}"))
        });
        let failure = reader.read("this", TextSize::zero()).unwrap_err();
        assert_eq!(failure.errors[0].expected, "not this");
    }
}
