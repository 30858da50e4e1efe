//! # Compiler
//!
//! Ahead-of-time compilation of a reader graph into a flatter executable
//! form with the identical input/output contract. Tree-walking
//! interpretation pays per-node dispatch for every attempted match; a
//! [`CompiledReader`] resolves the graph once, emitting one closure per
//! node with children bound at compile time and one named routine per
//! delegation point, so deep grammars cost a bounded set of direct calls
//! per attempted match instead.
//!
//! Per-nesting-level stack usage on recursive input remains: the compiler
//! removes dispatch overhead, not recursion.
//!
//! Compilation fails fast on graphs containing non-compilable readers
//! (`labeled`, `lookahead`, `fail_when`, `ignoring_success_failures`) or an
//! unbound delegate, naming the offending node.
//!
//! ```
//! use lector::{Reader, TextSize};
//!
//! let letters = Reader::char_class("[a-z]").unwrap().repeated();
//! let compiled = letters.compile().unwrap();
//!
//! let direct = letters.read("abc1", TextSize::zero());
//! assert_eq!(compiled.read("abc1", TextSize::zero()), direct);
//! ```

mod emit;
mod repr;

use crate::error::GrammarError;
use crate::reader::Reader;
use crate::result::ReadResult;
use crate::text::TextSize;
use emit::{CompiledFn, EmitCx, Routines};
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// The compiled, behaviorally identical form of a reader graph
pub struct CompiledReader {
    entry: CompiledFn,
    routines: Arc<Routines>,
    nodes: usize,
}

impl CompiledReader {
    /// Run the compiled routine; contractually identical to
    /// [`Reader::read`] on the source graph, for every input
    pub fn read(&self, input: &str, position: TextSize) -> ReadResult {
        self.entry.as_ref()(input, position)
    }

    /// Number of distinct nodes captured from the source graph; shared
    /// sub-readers count once
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    /// Number of delegation routines; one per distinct delegation point,
    /// regardless of input depth
    #[must_use]
    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }
}

impl fmt::Debug for CompiledReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledReader")
            .field("nodes", &self.nodes)
            .field("routines", &self.routines.len())
            .finish()
    }
}

/// Compile `reader` into its flattened executable form.
///
/// # Errors
///
/// [`GrammarError::NotCompilable`] when the graph reaches a node without a
/// compiled form, [`GrammarError::UnboundDelegate`] when a delegation point
/// has no target yet.
pub fn compile(reader: &Reader) -> Result<CompiledReader, GrammarError> {
    let repr = repr::capture(reader)?;
    let routines = Arc::new(Routines::new(repr.delegate_slots.len()));
    let nodes = repr.ids.len();
    let mut cx = EmitCx {
        repr: &repr,
        routines: Arc::clone(&routines),
        memo: HashMap::with_hasher(ahash::RandomState::new()),
    };
    let entry = emit::emit(reader, &mut cx);
    Ok(CompiledReader {
        entry,
        routines,
        nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_nodes_captured_once() {
        let digit = Reader::char_class("[0-9]").unwrap();
        // the same digit reader appears twice in the graph
        let pair = Reader::sequence([digit.clone(), Reader::char('-'), digit]);
        let compiled = compile(&pair).unwrap();
        // seq + digit + dash
        assert_eq!(compiled.node_count(), 3);
        assert_eq!(compiled.routine_count(), 0);
    }

    #[test]
    fn test_not_compilable_names_node() {
        let reader = Reader::char('a').labeled("letter");
        let err = compile(&reader).unwrap_err();
        match err {
            GrammarError::NotCompilable { node } => assert_eq!(node, "labeled"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unbound_delegate_rejected() {
        let delegate = Reader::delegate_labeled("value");
        let err = compile(&delegate).unwrap_err();
        match err {
            GrammarError::UnboundDelegate { label } => assert_eq!(label, "value"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_one_routine_per_delegation_point() {
        let a = Reader::delegate();
        let b = Reader::delegate();
        a.bind(Reader::choice([
            Reader::sequence([Reader::char('['), b.clone(), Reader::char(']')]),
            Reader::char('x'),
        ]))
        .unwrap();
        b.bind(Reader::choice([
            Reader::sequence([Reader::char('('), a.clone(), Reader::char(')')]),
            Reader::char('y'),
        ]))
        .unwrap();

        let compiled = compile(&a).unwrap();
        assert_eq!(compiled.routine_count(), 2);

        let direct = a.read("[(x)]", TextSize::zero());
        assert_eq!(compiled.read("[(x)]", TextSize::zero()), direct);
        assert!(direct.is_ok());
    }
}
