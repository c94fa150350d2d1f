//! Crate-wide error type.
//!
//! Every public constructor in this crate ultimately returns
//! `Result<_, CompileError>`. Stage-local errors (tokenizing a pattern,
//! expanding an interval, normalizing a grammar) carry precise variants of
//! their own and convert into one of the two buckets here at the public
//! boundary, mirroring how the teacher collapses `nom`'s parse errors and
//! its own `DfaParseError`/`NfaParseError` into a single CLI-facing error.

use thiserror::Error;

/// The two failure modes exposed across the scanner and parser compilers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A value had the right shape but the wrong kind: a negation atom where
    /// a class was expected, an empty grammar.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// A value was well-typed but out of range or otherwise unusable: a
    /// backwards interval, a duplicate pattern name, an undefined
    /// nonterminal on a right-hand side.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

impl CompileError {
    pub fn invalid_type(msg: impl Into<String>) -> Self {
        CompileError::InvalidType(msg.into())
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        CompileError::InvalidValue(msg.into())
    }
}
