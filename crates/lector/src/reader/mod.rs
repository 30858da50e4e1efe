//! # Readers
//!
//! A [`Reader`] is a small matching unit with the contract
//! `(input, position) -> Token | Failure`. Readers are wired once into an
//! immutable graph and are pure thereafter: a read has no side effects and
//! no state beyond its two arguments, so results are deterministic and
//! reusable. The one deliberate exception is the delegating reader, whose
//! target cell is assigned exactly once before the first read (see
//! [`Reader::delegate`]).
//!
//! Value and result transforms supplied by the caller must themselves be
//! pure for reads to stay deterministic.
//!
//! ## Quick start
//!
//! ```
//! use lector::{Reader, TextSize};
//!
//! let digit = Reader::char_class("[0-9]").unwrap();
//! let number = Reader::sequence([digit.clone(), digit.repeated()]);
//!
//! let token = number.read("42!", TextSize::zero()).unwrap();
//! assert_eq!(token.next, TextSize::from(2));
//! ```

pub mod comb;
pub mod delegate;
pub mod prim;

pub use comb::LabelOptions;

use crate::exec;
use crate::result::{Failure, ReadResult, Token, Value};
use crate::text::TextSize;
use compact_str::CompactString;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

use delegate::DelegateCell;

/// Caller-supplied value transform
pub(crate) type MapFn = dyn Fn(Value) -> Value + Send + Sync;
/// Caller-supplied token transform: full span access, produces the new value
pub(crate) type TokenFn = dyn Fn(&Token) -> Value + Send + Sync;
/// Caller-supplied whole-result transform
pub(crate) type ResultFn = dyn Fn(ReadResult) -> ReadResult + Send + Sync;
/// Caller-supplied success predicate for [`Reader::fail_when`]
pub(crate) type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;
/// Raw read function, usable as a delegate target
pub(crate) type RawReadFn = dyn Fn(&str, TextSize) -> ReadResult + Send + Sync;

/// How an always-failing reader produces its failure
#[derive(Clone)]
pub(crate) enum FailGen {
    Label(CompactString),
    Generate(Arc<dyn Fn(&str, TextSize) -> Failure + Send + Sync>),
}

/// One node of a reader graph.
///
/// Nodes are held behind `Arc` so sub-readers can be shared; the compiler
/// keys its traversal on node identity, never on value equality.
pub(crate) enum ReaderNode {
    Char {
        expected: char,
        fold: bool,
    },
    Literal {
        text: String,
        fold: bool,
    },
    CharClass {
        pattern: CompactString,
        matcher: Regex,
    },
    AnyChar,
    Eof,
    Succeed,
    Fail(FailGen),
    Choice(Vec<Reader>),
    Seq(Vec<Reader>),
    Repeat(Reader),
    Separated {
        item: Reader,
        separator: Reader,
    },
    Between {
        open: Reader,
        inner: Reader,
        close: Reader,
    },
    Optional(Reader),
    Lookahead {
        inner: Reader,
        ahead: Reader,
    },
    FailWhen {
        inner: Reader,
        predicate: Arc<PredicateFn>,
    },
    Map {
        inner: Reader,
        transform: Arc<MapFn>,
    },
    MapToken {
        inner: Reader,
        transform: Arc<TokenFn>,
    },
    MapResult {
        inner: Reader,
        transform: Arc<ResultFn>,
    },
    Labeled {
        inner: Reader,
        label: CompactString,
        options: LabelOptions,
    },
    IgnoreTrailing(Reader),
    Delegate(DelegateCell),
}

impl ReaderNode {
    /// Stable name for diagnostics and compiler errors
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Char { .. } => "char",
            Self::Literal { .. } => "literal",
            Self::CharClass { .. } => "char_class",
            Self::AnyChar => "any_char",
            Self::Eof => "eof",
            Self::Succeed => "succeed",
            Self::Fail(_) => "fail",
            Self::Choice(_) => "or",
            Self::Seq(_) => "sequence",
            Self::Repeat(_) => "repeated",
            Self::Separated { .. } => "separated_by",
            Self::Between { .. } => "between",
            Self::Optional(_) => "optional",
            Self::Lookahead { .. } => "lookahead",
            Self::FailWhen { .. } => "fail_when",
            Self::Map { .. } => "map",
            Self::MapToken { .. } => "map_token",
            Self::MapResult { .. } => "map_result",
            Self::Labeled { .. } => "labeled",
            Self::IgnoreTrailing(_) => "ignoring_success_failures",
            Self::Delegate(_) => "delegate",
        }
    }
}

impl fmt::Debug for ReaderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char { expected, fold } => f
                .debug_struct("Char")
                .field("expected", expected)
                .field("fold", fold)
                .finish(),
            Self::Literal { text, fold } => f
                .debug_struct("Literal")
                .field("text", text)
                .field("fold", fold)
                .finish(),
            Self::CharClass { pattern, .. } => {
                f.debug_struct("CharClass").field("pattern", pattern).finish()
            }
            Self::Labeled { label, options, .. } => f
                .debug_struct("Labeled")
                .field("label", label)
                .field("options", options)
                .finish(),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// A composable matching unit over text.
///
/// Cheap to clone: a `Reader` is a shared handle to an immutable node
/// graph. Constructors live on the type ([`Reader::char`],
/// [`Reader::choice`], ...); combinators are methods and consume `self`.
#[derive(Clone, Debug)]
pub struct Reader {
    pub(crate) node: Arc<ReaderNode>,
}

impl Reader {
    pub(crate) fn from_node(node: ReaderNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Run this reader against `input` starting at `position`.
    ///
    /// # Panics
    ///
    /// Panics if the graph contains a delegating reader that was never
    /// bound; that is a wiring bug, not a parse failure.
    pub fn read(&self, input: &str, position: TextSize) -> ReadResult {
        exec::read_node(&self.node, input, position)
    }

    /// The human-readable label this reader fails with.
    ///
    /// Primitives carry their own labels (`'a'`, `"null"`, a class
    /// pattern); wrappers mirror their inner reader; an alternation joins
    /// its branches with `or`.
    #[must_use]
    pub fn label(&self) -> CompactString {
        match &*self.node {
            ReaderNode::Char { expected, .. } => prim::char_label(*expected),
            ReaderNode::Literal { text, .. } => prim::literal_label(text),
            ReaderNode::CharClass { pattern, .. } => pattern.clone(),
            ReaderNode::AnyChar => CompactString::const_new("any character"),
            ReaderNode::Eof => CompactString::const_new("end of input"),
            ReaderNode::Succeed => CompactString::const_new("nothing"),
            ReaderNode::Fail(FailGen::Label(label)) => label.clone(),
            ReaderNode::Fail(FailGen::Generate(_)) => CompactString::const_new("failure"),
            ReaderNode::Choice(branches) => {
                let labels: Vec<CompactString> = branches.iter().map(Reader::label).collect();
                let joined: Vec<&str> = labels.iter().map(CompactString::as_str).collect();
                CompactString::from(joined.join(" or "))
            }
            ReaderNode::Seq(members) => members
                .first()
                .map(Reader::label)
                .unwrap_or_else(|| CompactString::const_new("nothing")),
            ReaderNode::Repeat(inner)
            | ReaderNode::Optional(inner)
            | ReaderNode::IgnoreTrailing(inner) => inner.label(),
            ReaderNode::Separated { item, .. } => item.label(),
            ReaderNode::Between { inner, .. } => inner.label(),
            ReaderNode::Lookahead { inner, .. } => inner.label(),
            ReaderNode::FailWhen { inner, .. } => inner.label(),
            ReaderNode::Map { inner, .. }
            | ReaderNode::MapToken { inner, .. }
            | ReaderNode::MapResult { inner, .. } => inner.label(),
            ReaderNode::Labeled { label, .. } => label.clone(),
            ReaderNode::Delegate(cell) => cell.label(),
        }
    }

    /// Compile this reader graph into its flattened executable form.
    ///
    /// Shorthand for [`crate::compile::compile`].
    pub fn compile(&self) -> Result<crate::compile::CompiledReader, crate::error::GrammarError> {
        crate::compile::compile(self)
    }
}
