//! Error types for the query-safety layer
//!
//! The guard deliberately reports blocked queries with a fixed, generic
//! message so that callers (and ultimately HTTP responses) never learn
//! which detection rule fired. Placeholder violations, on the other hand,
//! are programmer errors and carry enough detail to fix the query text.

use thiserror::Error;

use crate::driver::DriverError;

/// Errors produced by the query guard before or during execution
///
/// Validation variants are raised synchronously, before any I/O happens.
/// `Driver` wraps a failure from the underlying store; the guard logs it
/// with operation context and forwards it unchanged.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Query text matched a known-dangerous pattern
    ///
    /// The message is intentionally generic: it must not leak which rule
    /// fired. The matched rule is recorded in the suspicious-query audit.
    #[error("Potentially dangerous query pattern detected")]
    DangerousPattern,

    /// Number of `$N` placeholders does not match the supplied parameters
    #[error("Parameter count mismatch: expected {expected}, got {got}")]
    ParameterCountMismatch { expected: usize, got: usize },

    /// Placeholders are not a contiguous run starting at `$1`
    #[error("Invalid parameter sequence")]
    InvalidParameterSequence,

    /// The underlying driver failed; the original error is forwarded as-is
    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Errors raised by [`crate::builder::SafeQueryBuilder`] at construction time
///
/// These are programmer errors: identifiers and operators come from code,
/// never from request input, so a failure here means the call site is wrong.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Limit out of range: {0}")]
    InvalidLimit(i64),

    #[error("Offset out of range: {0}")]
    InvalidOffset(i64),
}
