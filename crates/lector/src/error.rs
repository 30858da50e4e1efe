//! Construction errors
//!
//! Everything here surfaces while a grammar is being wired or compiled,
//! never per-input at read time. Parse-time failures are ordinary
//! [`Failure`](crate::result::Failure) values instead.

use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// An error raised while building or compiling a grammar
#[derive(Debug, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("invalid character class /{pattern}/: {source}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lector::invalid_char_class)))]
    InvalidCharClass {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("delegating reader is already bound")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lector::already_bound)))]
    AlreadyBound,

    #[error("bind target is not a delegating reader")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lector::not_a_delegate)))]
    NotADelegate,

    #[error("delegating reader `{label}` is unbound")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lector::unbound_delegate)))]
    UnboundDelegate { label: String },

    #[error("`{node}` readers cannot be compiled")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lector::not_compilable)))]
    NotCompilable { node: String },
}

impl GrammarError {
    #[must_use]
    pub fn invalid_char_class(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidCharClass {
            pattern: pattern.into(),
            source,
        }
    }

    #[must_use]
    pub fn unbound_delegate(label: impl Into<String>) -> Self {
        Self::UnboundDelegate {
            label: label.into(),
        }
    }

    #[must_use]
    pub fn not_compilable(node: impl Into<String>) -> Self {
        Self::NotCompilable { node: node.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GrammarError::unbound_delegate("value");
        assert_eq!(format!("{err}"), "delegating reader `value` is unbound");

        let err = GrammarError::not_compilable("labeled");
        assert_eq!(format!("{err}"), "`labeled` readers cannot be compiled");
    }
}
