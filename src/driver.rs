//! Database driver abstraction used by the query guard
//!
//! The guard never talks to a connection pool directly; it forwards
//! validated statements to a [`QueryDriver`] implementation. Production
//! code wires in an adapter over the real pool, tests use mocks, and the
//! CLI uses [`NullDriver`] for validation-only dry runs.
//!
//! Parameters cross this boundary as [`SqlValue`], a closed set of types
//! the store accepts. Values are bound out-of-band and are never logged.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A typed positional parameter for a parameterized statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl fmt::Display for SqlValue {
    /// Displays only the type tag, never the value
    ///
    /// Parameter values must not end up in logs; anything that formats a
    /// `SqlValue` gets the variant name and nothing else.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(_) => write!(f, "text"),
            SqlValue::Int(_) => write!(f, "int"),
            SqlValue::Float(_) => write!(f, "float"),
            SqlValue::Bool(_) => write!(f, "bool"),
            SqlValue::Null => write!(f, "null"),
        }
    }
}

/// Result of a successfully executed statement
///
/// Rows are returned as JSON objects, mirroring what the model layer
/// serializes back to API handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Result rows as JSON objects
    pub rows: Vec<serde_json::Value>,
    /// Number of rows affected or returned
    pub row_count: u64,
}

/// Failure reported by the underlying store
///
/// Opaque by design: the guard logs it with operation context and
/// rethrows it unchanged, so whatever the pool reports is what the model
/// layer sees.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// Interface the query guard executes statements through
///
/// Implementations receive text that already passed pattern and
/// placeholder validation. One statement per call; no batching, no
/// retries. A failed query fails the originating request.
pub trait QueryDriver: Send + Sync {
    /// Executes a validated statement with its bound parameters
    fn execute(
        &self,
        text: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<QueryResult, DriverError>> + Send;
}

/// Driver that accepts every statement and returns an empty result
///
/// Used by the CLI `check-query` command to exercise the full guard path
/// without a database, and handy as a test double.
#[derive(Debug, Default)]
pub struct NullDriver;

impl QueryDriver for NullDriver {
    async fn execute(
        &self,
        _text: &str,
        _params: &[SqlValue],
    ) -> Result<QueryResult, DriverError> {
        Ok(QueryResult::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_never_exposes_values() {
        assert_eq!(SqlValue::Text("secret".into()).to_string(), "text");
        assert_eq!(SqlValue::Int(42).to_string(), "int");
        assert_eq!(SqlValue::Null.to_string(), "null");
    }

    #[tokio::test]
    async fn null_driver_returns_empty_result() {
        let driver = NullDriver;
        let result = driver.execute("SELECT 1", &[]).await.unwrap();
        assert_eq!(result.row_count, 0);
        assert!(result.rows.is_empty());
    }
}
