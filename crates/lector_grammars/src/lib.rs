//! # Lector grammars
//!
//! Grammars built on the [`lector`] reader engine, consuming only its
//! public combinator API:
//!
//! - [`json`] — a complete JSON grammar plus conversion to native
//!   scalars/containers; compilable as-is.
//! - [`where_lang`] — a filter-expression language read as flat operator
//!   chains, resolved by a grammar-owned precedence-climbing pass over a
//!   caller-supplied operator table; interpreter-only by design.

pub mod json;
pub mod where_lang;

mod support;
