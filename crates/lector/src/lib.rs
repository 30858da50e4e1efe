//! # Lector
//!
//! A declarative parsing engine: small, composable matching units
//! ("readers") combine into recursive-descent parsers over text, with
//! diagnostics that remember every attempted alternative. A second stage
//! compiles a wired grammar into a flatter executable form with an
//! identical input/output contract.
//!
//! ## Overview
//!
//! - **Result model**: [`Token`] / [`Failure`] / [`Expectation`] — parse
//!   failures are values, never panics, and successes can carry trailing
//!   diagnostics explaining the near misses along the way.
//! - **Primitive readers**: [`Reader::char`], [`Reader::literal`],
//!   [`Reader::char_class`], [`Reader::any_char`], [`Reader::eof`],
//!   [`Reader::fail`].
//! - **Combinators**: alternation, sequencing, repetition, separation,
//!   enclosure, optional, lookahead, conditional failure, value/result
//!   transforms, labeling, diagnostic suppression — all methods on
//!   [`Reader`], composing freely.
//! - **Delegation**: [`Reader::delegate`] is a forward reference bound
//!   exactly once, enabling recursive and mutually recursive grammars.
//! - **Compiler**: [`compile`] produces a [`CompiledReader`] that is
//!   behaviorally identical to interpretation, minus per-node dispatch.
//!
//! ## Quick Start
//!
//! ```
//! use lector::{Reader, TextSize, Value};
//!
//! // a parenthesized, comma-separated list of letters: (a,b,c)
//! let letter = Reader::char_class("[a-z]").unwrap();
//! let list = letter
//!     .separated_by(Reader::char(','))
//!     .between(Reader::char('('), Reader::char(')'));
//!
//! let token = list.read("(a,b,c)", TextSize::zero()).unwrap();
//! assert_eq!(token.next, TextSize::from(7));
//! assert_eq!(
//!     token.value,
//!     Value::List(vec![Value::Char('a'), Value::Char('b'), Value::Char('c')])
//! );
//!
//! // failures keep every attempted alternative; the furthest one shows
//! // how far the read progressed before giving up
//! let failure = list.read("(a,1)", TextSize::zero()).unwrap_err();
//! assert_eq!(failure.furthest_position(), TextSize::from(3));
//! ```
//!
//! ## Execution model
//!
//! Reads are synchronous and call-stack-recursive; one frame per nesting
//! level of the input in both interpreted and compiled execution, so a
//! platform recursion ceiling remains the practical bound on input depth.
//! Grammars are immutable after wiring and safe to share across threads.

pub mod compile;
pub mod error;
pub mod line_col;
pub mod reader;
pub mod result;
pub mod text;

mod exec;

pub use compile::{compile, CompiledReader};
pub use error::GrammarError;
pub use line_col::{line_col, LineCol};
pub use reader::{LabelOptions, Reader};
pub use result::{ContextFrame, ErrorList, Expectation, Failure, ReadResult, Token, Value};
pub use text::{TextRange, TextSize};
