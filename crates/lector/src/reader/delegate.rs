//! Delegating readers
//!
//! Self-referential grammars (an array contains values; a value contains
//! arrays) cannot be built by strictly nested construction. A delegating
//! reader is created without a target and bound exactly once afterward,
//! either to another reader or to a raw read function; reads forward to
//! whatever is bound. The target cell is a one-shot [`OnceLock`]: a second
//! bind is a construction error, and a read before any bind is a wiring
//! bug reported by panic, never silently.

use super::{RawReadFn, Reader, ReaderNode};
use crate::error::GrammarError;
use crate::result::ReadResult;
use crate::text::TextSize;
use compact_str::CompactString;
use std::sync::{Arc, OnceLock};

pub(crate) enum DelegateTarget {
    Reader(Reader),
    Raw(Arc<RawReadFn>),
}

pub(crate) struct DelegateCell {
    pub(crate) target: OnceLock<DelegateTarget>,
    pub(crate) label_override: Option<CompactString>,
}

impl DelegateCell {
    /// The delegate's label: the override when present, else the bound
    /// target's own label
    pub(crate) fn label(&self) -> CompactString {
        if let Some(label) = &self.label_override {
            return label.clone();
        }
        match self.target.get() {
            Some(DelegateTarget::Reader(reader)) => reader.label(),
            Some(DelegateTarget::Raw(_)) => CompactString::const_new("delegate"),
            None => CompactString::const_new("<unbound>"),
        }
    }
}

impl Reader {
    /// A forward-reference placeholder with no target yet.
    ///
    /// Clone it into the readers that need it, then [`bind`](Reader::bind)
    /// it exactly once when the full grammar exists.
    #[must_use]
    pub fn delegate() -> Self {
        Self::from_node(ReaderNode::Delegate(DelegateCell {
            target: OnceLock::new(),
            label_override: None,
        }))
    }

    /// A delegate whose label is fixed rather than mirroring its target
    #[must_use]
    pub fn delegate_labeled(label: impl Into<CompactString>) -> Self {
        Self::from_node(ReaderNode::Delegate(DelegateCell {
            target: OnceLock::new(),
            label_override: Some(label.into()),
        }))
    }

    /// Bind this delegate to `target`.
    ///
    /// # Errors
    ///
    /// [`GrammarError::NotADelegate`] when `self` is not a delegating
    /// reader, [`GrammarError::AlreadyBound`] on a second bind.
    pub fn bind(&self, target: Reader) -> Result<(), GrammarError> {
        self.bind_target(DelegateTarget::Reader(target))
    }

    /// Bind this delegate to a raw read function.
    ///
    /// The function is carried through compilation as a late-bound
    /// dependency, never re-implemented.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Reader::bind`].
    pub fn bind_fn(
        &self,
        target: impl Fn(&str, TextSize) -> ReadResult + Send + Sync + 'static,
    ) -> Result<(), GrammarError> {
        self.bind_target(DelegateTarget::Raw(Arc::new(target)))
    }

    fn bind_target(&self, target: DelegateTarget) -> Result<(), GrammarError> {
        let ReaderNode::Delegate(cell) = &*self.node else {
            return Err(GrammarError::NotADelegate);
        };
        cell.target
            .set(target)
            .map_err(|_| GrammarError::AlreadyBound)
    }
}
