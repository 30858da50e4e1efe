//! Combinators
//!
//! Every method here wraps one or more readers in a new node and returns a
//! fresh `Reader`; inputs are never mutated. See the module docs on
//! [`super`] for the purity contract.

use super::{Reader, ReaderNode};
use crate::result::{ReadResult, Token, Value};
use compact_str::CompactString;
use std::sync::Arc;

/// Toggles for [`Reader::labeled_with`].
///
/// The default adds context only: every error produced inside the scope
/// gets the label and the scope entry position prepended to its context
/// chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOptions {
    /// Prepend `(label, entry position)` to each inner error's context
    pub context: bool,
    /// Collapse the scope's whole failure into one error whose expectation
    /// is the label, hiding fine-grained sub-expectations
    pub relabel: bool,
    /// Retain only the earliest-position sub-error; for fine-grained
    /// character classes that produce duplicate-position noise
    pub simplify: bool,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            context: true,
            relabel: false,
            simplify: false,
        }
    }
}

impl LabelOptions {
    /// The relabel preset: one friendly expectation, no context
    #[must_use]
    pub const fn relabel() -> Self {
        Self {
            context: false,
            relabel: true,
            simplify: false,
        }
    }

    /// The simplify preset: earliest sub-error only, plus context
    #[must_use]
    pub const fn simplify() -> Self {
        Self {
            context: true,
            relabel: false,
            simplify: true,
        }
    }
}

/// Append `reader` to `branches`, splicing bare alternations flat
fn push_flattened(branches: &mut Vec<Reader>, reader: Reader) {
    if let ReaderNode::Choice(inner) = &*reader.node {
        branches.extend(inner.iter().cloned());
    } else {
        branches.push(reader);
    }
}

impl Reader {
    /// Ordered alternation over `branches`; the first success wins.
    ///
    /// When every branch fails, the failure carries each branch's errors
    /// concatenated in trial order. Nested bare alternations are flattened
    /// into one n-ary node.
    ///
    /// # Panics
    ///
    /// Panics when `branches` is empty; an alternation needs at least one
    /// branch.
    #[must_use]
    pub fn choice(branches: impl IntoIterator<Item = Reader>) -> Self {
        let mut flat = Vec::new();
        for branch in branches {
            push_flattened(&mut flat, branch);
        }
        assert!(!flat.is_empty(), "choice requires at least one branch");
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Self::from_node(ReaderNode::Choice(flat))
    }

    /// `self`, or `other` when `self` fails at the same position
    #[must_use]
    pub fn or(self, other: Reader) -> Self {
        Self::choice([self, other])
    }

    /// Left-to-right sequence over `members`, threading the position.
    ///
    /// The token's value is the flat list of member values; the first
    /// failing member fails the sequence, keeping that member's errors
    /// behind any trailing diagnostics of earlier successful members.
    ///
    /// # Panics
    ///
    /// Panics when `members` is empty.
    #[must_use]
    pub fn sequence(members: impl IntoIterator<Item = Reader>) -> Self {
        let members: Vec<Reader> = members.into_iter().collect();
        assert!(!members.is_empty(), "sequence requires at least one member");
        Self::from_node(ReaderNode::Seq(members))
    }

    /// `self` then `next`; the value is the two-element list `[a, b]`
    #[must_use]
    pub fn then(self, next: Reader) -> Self {
        Self::sequence([self, next])
    }

    /// Zero or more of `self`; never fails.
    ///
    /// The value is the list of matched values; the span runs from the
    /// start to the end of the last success (empty when none matched), and
    /// the failure that ended the run is kept as a trailing diagnostic.
    #[must_use]
    pub fn repeated(self) -> Self {
        Self::from_node(ReaderNode::Repeat(self))
    }

    /// `self`, then zero or more of (`separator` then `self`); never fails.
    ///
    /// Separators are consumed but dropped from the value list. A leading
    /// or trailing separator is not absorbed: it is left for downstream
    /// readers to fail on.
    #[must_use]
    pub fn separated_by(self, separator: Reader) -> Self {
        Self::from_node(ReaderNode::Separated {
            item: self,
            separator,
        })
    }

    /// `open`, `self`, `close`, in sequence.
    ///
    /// The token carries `self`'s own position and length (the content
    /// without its delimiters) while `next` reflects consumption through
    /// `close`.
    #[must_use]
    pub fn between(self, open: Reader, close: Reader) -> Self {
        Self::from_node(ReaderNode::Between {
            open,
            inner: self,
            close,
        })
    }

    /// [`Reader::between`] with the same delimiter on both sides
    #[must_use]
    pub fn wrapped_by(self, delimiter: Reader) -> Self {
        let close = delimiter.clone();
        self.between(delimiter, close)
    }

    /// `self`, or a zero-length `Null` success when `self` fails.
    ///
    /// The inner failure is kept as a trailing diagnostic; never fails.
    #[must_use]
    pub fn optional(self) -> Self {
        Self::from_node(ReaderNode::Optional(self))
    }

    /// `self`, asserting that `ahead` matches right after it.
    ///
    /// Only `self`'s value and span are returned; `ahead`'s consumption is
    /// not reflected in `next`.
    #[must_use]
    pub fn lookahead(self, ahead: Reader) -> Self {
        Self::from_node(ReaderNode::Lookahead { inner: self, ahead })
    }

    /// Convert a success into a failure when `predicate` holds.
    ///
    /// The failure is labeled with `self`'s own label, positioned where the
    /// read started.
    #[must_use]
    pub fn fail_when(self, predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::from_node(ReaderNode::FailWhen {
            inner: self,
            predicate: Arc::new(predicate),
        })
    }

    /// Transform the value of a success; span and trailing are untouched
    #[must_use]
    pub fn map(self, transform: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self::from_node(ReaderNode::Map {
            inner: self,
            transform: Arc::new(transform),
        })
    }

    /// Transform a success with access to its whole token
    #[must_use]
    pub fn map_token(self, transform: impl Fn(&Token) -> Value + Send + Sync + 'static) -> Self {
        Self::from_node(ReaderNode::MapToken {
            inner: self,
            transform: Arc::new(transform),
        })
    }

    /// Rewrite the whole result, success or failure.
    ///
    /// The most general transform; `char` and `literal`-style canonical
    /// values and aggregated labels are the typical uses.
    #[must_use]
    pub fn map_result(
        self,
        transform: impl Fn(ReadResult) -> ReadResult + Send + Sync + 'static,
    ) -> Self {
        Self::from_node(ReaderNode::MapResult {
            inner: self,
            transform: Arc::new(transform),
        })
    }

    /// Label this scope for diagnostics with the default options
    #[must_use]
    pub fn labeled(self, label: impl Into<CompactString>) -> Self {
        self.labeled_with(label, LabelOptions::default())
    }

    /// Label this scope for diagnostics; see [`LabelOptions`]
    #[must_use]
    pub fn labeled_with(self, label: impl Into<CompactString>, options: LabelOptions) -> Self {
        Self::from_node(ReaderNode::Labeled {
            inner: self,
            label: label.into(),
            options,
        })
    }

    /// Drop trailing diagnostics from successes; failures pass through.
    ///
    /// Used at production boundaries once a result is definitively
    /// accepted, so interior near-misses stop bubbling outward.
    #[must_use]
    pub fn ignoring_success_failures(self) -> Self {
        Self::from_node(ReaderNode::IgnoreTrailing(self))
    }
}
