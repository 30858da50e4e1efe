//! # Result Model
//!
//! Success and failure values for reads, and the aggregation helpers the
//! combinators build on.
//!
//! A read either produces a [`Token`] (a value plus the span it was read
//! from) or a [`Failure`] (one or more positioned [`Expectation`]s). Both
//! are ordinary values; a failing read never panics. A `Token` may carry
//! `trailing` expectations: diagnostic-only records of near misses (why a
//! repetition stopped, which alternatives were tried first) that never
//! affect the value or the consumed range.

use crate::text::{TextRange, TextSize};
use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt;

/// Error list storage; nearly always one or two entries
pub type ErrorList = SmallVec<[Expectation; 2]>;

/// Dynamic result value produced by readers.
///
/// Grammars move values through a single dynamic type so that value
/// transforms compose freely and the compiler can thread them through the
/// flattened form unchanged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Str(String),
    Num(f64),
    List(Vec<Value>),
    /// Ordered string-keyed entries
    Map(Vec<(String, Value)>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Consume a `List` value, or wrap any other value in a one-element list
    #[must_use]
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Self::List(items) => items,
            other => vec![other],
        }
    }
}

/// One frame of an error's context chain: an enclosing labeled scope and
/// the position where that scope was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFrame {
    pub label: CompactString,
    pub position: TextSize,
}

impl ContextFrame {
    #[must_use]
    pub fn new(label: impl Into<CompactString>, position: TextSize) -> Self {
        Self {
            label: label.into(),
            position,
        }
    }
}

/// A positioned expectation: what was required and where.
///
/// `context` lists the enclosing labeled scopes, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub position: TextSize,
    pub expected: CompactString,
    pub context: SmallVec<[ContextFrame; 2]>,
}

impl Expectation {
    #[must_use]
    pub fn new(position: TextSize, expected: impl Into<CompactString>) -> Self {
        Self {
            position,
            expected: expected.into(),
            context: SmallVec::new(),
        }
    }

    /// Prepend an enclosing scope to the context chain
    pub fn push_outer(&mut self, frame: ContextFrame) {
        self.context.insert(0, frame);
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} at {}", self.expected, self.position)?;
        if !self.context.is_empty() {
            let chain: Vec<&str> = self.context.iter().map(|c| c.label.as_str()).collect();
            write!(f, " (in {})", chain.join(" > "))?;
        }
        Ok(())
    }
}

impl std::error::Error for Expectation {}

/// A successful read: the value and the span it was read from.
///
/// `position`/`length` and `next` are independently meaningful: an
/// enclosure reports the inner span while `next` reflects consumption
/// through the closing delimiter.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: Value,
    pub position: TextSize,
    pub length: TextSize,
    pub next: TextSize,
    /// Diagnostic-only near misses recorded on the way to this success
    pub trailing: ErrorList,
}

impl Token {
    #[must_use]
    pub fn new(value: Value, position: TextSize, length: TextSize, next: TextSize) -> Self {
        Self {
            value,
            position,
            length,
            next,
            trailing: ErrorList::new(),
        }
    }

    /// Token whose span runs from `position` to `next`
    #[must_use]
    pub fn spanning(value: Value, position: TextSize, next: TextSize) -> Self {
        Self::new(value, position, next - position, next)
    }

    #[must_use]
    pub fn range(&self) -> TextRange {
        TextRange::at(self.position, self.length)
    }
}

/// A failed read: one or more expectations, in the order they were tried.
///
/// Signals zero consumption at the attempted position; callers are free to
/// retry an alternative at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub errors: ErrorList,
}

impl Failure {
    #[must_use]
    pub fn of(errors: ErrorList) -> Self {
        debug_assert!(!errors.is_empty(), "a failure carries at least one error");
        Self { errors }
    }

    /// Single-expectation failure
    #[must_use]
    pub fn expected(position: TextSize, label: impl Into<CompactString>) -> Self {
        let mut errors = ErrorList::new();
        errors.push(Expectation::new(position, label));
        Self { errors }
    }

    /// The greatest position any expectation was recorded at.
    ///
    /// Errors at this position show how far the read progressed before
    /// giving up and are the most actionable diagnostic.
    #[must_use]
    pub fn furthest_position(&self) -> TextSize {
        self.errors
            .iter()
            .map(|e| e.position)
            .max()
            .unwrap_or(TextSize::zero())
    }

    /// The expectations recorded at the furthest position, in trial order
    #[must_use]
    pub fn furthest(&self) -> Vec<&Expectation> {
        self.errors_at(self.furthest_position())
    }

    /// The expectations recorded at `position`, in trial order
    #[must_use]
    pub fn errors_at(&self, position: TextSize) -> Vec<&Expectation> {
        self.errors
            .iter()
            .filter(|e| e.position == position)
            .collect()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {}

/// Outcome of a read: parse failures are values, never panics
pub type ReadResult = Result<Token, Failure>;
