//! Closure emission
//!
//! Second compilation pass: each captured node becomes one flat closure
//! with its children resolved at emission time, so a compiled read pays no
//! per-node dispatch. Every distinct delegation point becomes one slot in a
//! routine table; the slot's closure is resolved exactly once, and the
//! delegate's call sites go through a trampoline onto that slot, which is
//! what lets cyclic grammars terminate emission. Caller-supplied functions
//! (raw delegate targets, transforms, failure generators, predicates) are
//! carried into the closures as late-bound dependencies.

use super::repr::{NodeKey, NodeMap, Repr};
use crate::exec::{self, RunChild};
use crate::reader::delegate::DelegateTarget;
use crate::reader::{Reader, ReaderNode};
use crate::result::ReadResult;
use crate::text::TextSize;
use std::sync::{Arc, OnceLock};

/// A compiled node: same contract as [`Reader::read`]
pub(crate) type CompiledFn = Arc<dyn Fn(&str, TextSize) -> ReadResult + Send + Sync>;

impl RunChild for CompiledFn {
    fn run(&self, input: &str, pos: TextSize) -> ReadResult {
        self.as_ref()(input, pos)
    }
}

/// Routine table: one resolved closure per delegation point
pub(crate) struct Routines {
    slots: Vec<OnceLock<CompiledFn>>,
}

impl Routines {
    pub(crate) fn new(count: usize) -> Self {
        Self {
            slots: (0..count).map(|_| OnceLock::new()).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn call(&self, slot: usize, input: &str, pos: TextSize) -> ReadResult {
        let routine = self.slots[slot]
            .get()
            .expect("delegate routine is resolved before compilation returns");
        routine.as_ref()(input, pos)
    }

    fn is_resolved(&self, slot: usize) -> bool {
        self.slots[slot].get().is_some()
    }

    fn resolve(&self, slot: usize, routine: CompiledFn) {
        let _ = self.slots[slot].set(routine);
    }
}

pub(crate) struct EmitCx<'a> {
    pub(crate) repr: &'a Repr,
    pub(crate) routines: Arc<Routines>,
    pub(crate) memo: NodeMap<CompiledFn>,
}

/// Emit the closure for `reader`, reusing already-emitted shared nodes
pub(crate) fn emit(reader: &Reader, cx: &mut EmitCx<'_>) -> CompiledFn {
    let key: NodeKey = Arc::as_ptr(&reader.node);
    if let Some(compiled) = cx.memo.get(&key) {
        return Arc::clone(compiled);
    }

    let compiled: CompiledFn = match &*reader.node {
        ReaderNode::Char { expected, fold } => {
            let (expected, fold) = (*expected, *fold);
            Arc::new(move |input: &str, pos: TextSize| exec::read_char(expected, fold, input, pos))
        }
        ReaderNode::Literal { text, fold } => {
            let (text, fold) = (text.clone(), *fold);
            Arc::new(move |input: &str, pos: TextSize| exec::read_literal(&text, fold, input, pos))
        }
        ReaderNode::CharClass { pattern, matcher } => {
            let (pattern, matcher) = (pattern.clone(), matcher.clone());
            Arc::new(move |input: &str, pos: TextSize| exec::read_char_class(&pattern, &matcher, input, pos))
        }
        ReaderNode::AnyChar => Arc::new(exec::read_any),
        ReaderNode::Eof => Arc::new(exec::read_eof),
        ReaderNode::Succeed => Arc::new(|_input: &str, pos: TextSize| exec::read_succeed(pos)),
        ReaderNode::Fail(generate) => {
            let generate = generate.clone();
            Arc::new(move |input: &str, pos: TextSize| exec::read_fail(&generate, input, pos))
        }

        ReaderNode::Choice(branches) => {
            let children: Vec<CompiledFn> = branches.iter().map(|b| emit(b, cx)).collect();
            Arc::new(move |input: &str, pos: TextSize| exec::run_choice(&children, input, pos))
        }
        ReaderNode::Seq(members) => {
            let children: Vec<CompiledFn> = members.iter().map(|m| emit(m, cx)).collect();
            Arc::new(move |input: &str, pos: TextSize| exec::run_seq(&children, input, pos))
        }
        ReaderNode::Repeat(inner) => {
            let child = emit(inner, cx);
            Arc::new(move |input: &str, pos: TextSize| exec::run_repeat(&child, input, pos))
        }
        ReaderNode::Separated { item, separator } => {
            let item = emit(item, cx);
            let separator = emit(separator, cx);
            Arc::new(move |input: &str, pos: TextSize| exec::run_separated(&item, &separator, input, pos))
        }
        ReaderNode::Between { open, inner, close } => {
            let open = emit(open, cx);
            let inner = emit(inner, cx);
            let close = emit(close, cx);
            Arc::new(move |input: &str, pos: TextSize| exec::run_between(&open, &inner, &close, input, pos))
        }
        ReaderNode::Optional(inner) => {
            let child = emit(inner, cx);
            Arc::new(move |input: &str, pos: TextSize| exec::run_optional(&child, input, pos))
        }

        ReaderNode::Map { inner, transform } => {
            let child = emit(inner, cx);
            let transform = Arc::clone(transform);
            Arc::new(move |input: &str, pos: TextSize| exec::run_map(&child, transform.as_ref(), input, pos))
        }
        ReaderNode::MapToken { inner, transform } => {
            let child = emit(inner, cx);
            let transform = Arc::clone(transform);
            Arc::new(move |input: &str, pos: TextSize| {
                exec::run_map_token(&child, transform.as_ref(), input, pos)
            })
        }
        ReaderNode::MapResult { inner, transform } => {
            let child = emit(inner, cx);
            let transform = Arc::clone(transform);
            Arc::new(move |input: &str, pos: TextSize| {
                exec::run_map_result(&child, transform.as_ref(), input, pos)
            })
        }

        ReaderNode::Labeled { .. }
        | ReaderNode::Lookahead { .. }
        | ReaderNode::FailWhen { .. }
        | ReaderNode::IgnoreTrailing(_) => {
            unreachable!("non-compilable node rejected during capture")
        }

        ReaderNode::Delegate(cell) => {
            let slot = cx.repr.delegate_slots[&key];
            let routines = Arc::clone(&cx.routines);
            let trampoline: CompiledFn =
                Arc::new(move |input: &str, pos: TextSize| routines.call(slot, input, pos));
            // memoize the trampoline first: emitting the target may loop
            // back to this very delegate
            cx.memo.insert(key, Arc::clone(&trampoline));
            if !cx.routines.is_resolved(slot) {
                let routine: CompiledFn = match cell.target.get() {
                    Some(DelegateTarget::Reader(target)) => emit(target, cx),
                    Some(DelegateTarget::Raw(read)) => {
                        let read = Arc::clone(read);
                        Arc::new(move |input: &str, pos: TextSize| read.as_ref()(input, pos))
                    }
                    None => unreachable!("unbound delegate rejected during capture"),
                };
                cx.routines.resolve(slot, routine);
            }
            return trampoline;
        }
    };

    cx.memo.insert(key, Arc::clone(&compiled));
    compiled
}
