//! Graph capture
//!
//! First compilation pass: walk the reader graph from the root, assigning
//! each node a stable id the first time it is visited and referencing it by
//! id afterward. Identity is the node's address, never value equality, so
//! shared sub-readers and cycles come out as a finite structure. The same
//! pass validates compilability and delegate binding, failing fast with the
//! offending node.

use crate::error::GrammarError;
use crate::reader::delegate::DelegateTarget;
use crate::reader::{Reader, ReaderNode};
use hashbrown::HashMap;

pub(crate) type NodeKey = *const ReaderNode;
pub(crate) type NodeMap<V> = HashMap<NodeKey, V, ahash::RandomState>;

/// Finite snapshot of a (possibly cyclic) reader graph
pub(crate) struct Repr {
    /// Node identity -> visit-order id
    pub(crate) ids: NodeMap<usize>,
    /// One slot per distinct delegation point
    pub(crate) delegate_slots: NodeMap<usize>,
}

impl Repr {
    fn new() -> Self {
        Self {
            ids: NodeMap::with_hasher(ahash::RandomState::new()),
            delegate_slots: NodeMap::with_hasher(ahash::RandomState::new()),
        }
    }
}

/// Capture the graph under `root`, or fail naming the offending node
pub(crate) fn capture(root: &Reader) -> Result<Repr, GrammarError> {
    let mut repr = Repr::new();
    visit(root, &mut repr)?;
    Ok(repr)
}

fn visit(reader: &Reader, repr: &mut Repr) -> Result<(), GrammarError> {
    let key: NodeKey = std::sync::Arc::as_ptr(&reader.node);
    if repr.ids.contains_key(&key) {
        return Ok(());
    }
    let id = repr.ids.len();
    repr.ids.insert(key, id);

    match &*reader.node {
        ReaderNode::Char { .. }
        | ReaderNode::Literal { .. }
        | ReaderNode::CharClass { .. }
        | ReaderNode::AnyChar
        | ReaderNode::Eof
        | ReaderNode::Succeed
        | ReaderNode::Fail(_) => Ok(()),

        ReaderNode::Choice(branches) | ReaderNode::Seq(branches) => {
            for branch in branches {
                visit(branch, repr)?;
            }
            Ok(())
        }

        ReaderNode::Repeat(inner) | ReaderNode::Optional(inner) => visit(inner, repr),

        ReaderNode::Separated { item, separator } => {
            visit(item, repr)?;
            visit(separator, repr)
        }

        ReaderNode::Between { open, inner, close } => {
            visit(open, repr)?;
            visit(inner, repr)?;
            visit(close, repr)
        }

        ReaderNode::Map { inner, .. }
        | ReaderNode::MapToken { inner, .. }
        | ReaderNode::MapResult { inner, .. } => visit(inner, repr),

        node @ (ReaderNode::Labeled { .. }
        | ReaderNode::Lookahead { .. }
        | ReaderNode::FailWhen { .. }
        | ReaderNode::IgnoreTrailing(_)) => {
            Err(GrammarError::not_compilable(node.kind_name()))
        }

        ReaderNode::Delegate(cell) => {
            let slot = repr.delegate_slots.len();
            repr.delegate_slots.insert(key, slot);
            match cell.target.get() {
                Some(DelegateTarget::Reader(target)) => visit(target, repr),
                // raw functions are threaded through as-is
                Some(DelegateTarget::Raw(_)) => Ok(()),
                None => Err(GrammarError::unbound_delegate(cell.label().as_str())),
            }
        }
    }
}
