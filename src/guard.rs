//! Query guard: the single gate between the model layer and the store
//!
//! Every statement the application runs goes through [`QueryGuard::safe_query`]:
//! - Pattern validation rejects text resembling injection (stacked
//!   statements, `UNION SELECT`, tautologies, SQL comments, interpolation
//!   leftovers, string concatenation)
//! - Placeholder validation enforces the one genuine contract of this
//!   layer: `$1..$N` placeholders form a contiguous run starting at 1 and
//!   their count equals the supplied parameter count
//! - Execution is forwarded to the injected driver, timed, and logged
//!   with a redacted copy of the text (never parameter values)
//!
//! There is no retry and no backoff: a failed query fails the originating
//! request, and validation rejections happen before any I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::audit::QueryAudit;
use crate::driver::{QueryDriver, QueryResult, SqlValue};
use crate::error::GuardError;

/// Dangerous-pattern rules, labeled for the audit log
///
/// The labels stay internal: callers only ever see the generic
/// dangerous-pattern error.
static DANGEROUS_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "stacked-statement",
            Regex::new(r"(?i);\s*(drop|delete|insert|update|create|alter)\b").unwrap(),
        ),
        ("union-select", Regex::new(r"(?i)\bunion\s+select\b").unwrap()),
        (
            "quoted-tautology",
            Regex::new(r"(?i)'\s*or\s*'1'\s*=\s*'1").unwrap(),
        ),
        ("or-tautology", Regex::new(r"(?i)\bor\s+1\s*=\s*1\b").unwrap()),
        ("line-comment", Regex::new(r"--").unwrap()),
        ("block-comment", Regex::new(r"/\*").unwrap()),
        (
            "template-artifact",
            Regex::new(r"\$\{[^}]*\}").unwrap(),
        ),
        ("string-concat", Regex::new(r"'\s*\+|\+\s*'").unwrap()),
    ]
});

/// Literal value in a WHERE clause; checked only for zero-parameter calls
///
/// Catches string-built queries that forgot to parameterize. The digit
/// alternative requires a non-`$` prefix so placeholders never match.
static WHERE_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bwhere\b.*('[^']*'|[=<>(,\s]\d+)").unwrap());

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Guard configuration
///
/// `slow_query_ms` is the duration above which a successful query gets an
/// extra warning log for performance review. Tests typically lower it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    pub slow_query_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { slow_query_ms: 1000 }
    }
}

/// Validates and executes parameterized statements against one driver
///
/// Constructed explicitly with its driver, config, and a shared audit
/// handle; there is no global instance. The model layer owns the SQL
/// text, the guard owns the right to refuse it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use palisade::audit::QueryAudit;
/// use palisade::driver::{NullDriver, SqlValue};
/// use palisade::guard::{GuardConfig, QueryGuard};
///
/// # async fn example() -> Result<(), palisade::error::GuardError> {
/// let guard = QueryGuard::new(NullDriver, GuardConfig::default(), Arc::new(QueryAudit::new()));
/// let result = guard
///     .safe_query(
///         "SELECT id, title FROM ads WHERE user_id = $1",
///         &[SqlValue::Int(7)],
///         "ads.list_by_user",
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct QueryGuard<D> {
    driver: D,
    config: GuardConfig,
    audit: Arc<QueryAudit>,
    query_seq: AtomicU64,
}

impl<D: QueryDriver> QueryGuard<D> {
    pub fn new(driver: D, config: GuardConfig, audit: Arc<QueryAudit>) -> Self {
        Self {
            driver,
            config,
            audit,
            query_seq: AtomicU64::new(0),
        }
    }

    /// Handle to the shared suspicious-query audit
    pub fn audit(&self) -> &Arc<QueryAudit> {
        &self.audit
    }

    /// Runs pattern and placeholder validation without executing
    ///
    /// Blocked patterns are recorded in the audit. Used by `safe_query`
    /// and directly by callers that want a dry run.
    pub fn validate(&self, text: &str, params: &[SqlValue]) -> Result<(), GuardError> {
        if let Some(rule) = match_dangerous_pattern(text, params.len()) {
            warn!(rule, query = %redact(text), "blocked dangerous query pattern");
            self.audit.record(redact(text), rule, params.len());
            return Err(GuardError::DangerousPattern);
        }
        validate_placeholders(text, params.len())
    }

    /// Validates and executes a statement, logging the outcome
    ///
    /// On success, logs operation name, duration, row count, and a
    /// monotonically increasing query id; queries slower than the
    /// configured threshold get an additional warning with the redacted
    /// text. On driver failure the error is logged with context and
    /// rethrown unchanged.
    pub async fn safe_query(
        &self,
        text: &str,
        params: &[SqlValue],
        operation: &str,
    ) -> Result<QueryResult, GuardError> {
        self.validate(text, params)?;

        let query_id = self.query_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let start = Instant::now();

        match self.driver.execute(text, params).await {
            Ok(result) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                info!(
                    operation,
                    query_id,
                    duration_ms = elapsed_ms,
                    rows = result.row_count,
                    "query executed"
                );
                if elapsed_ms > self.config.slow_query_ms {
                    warn!(
                        operation,
                        query_id,
                        duration_ms = elapsed_ms,
                        query = %redact(text),
                        "slow query"
                    );
                }
                Ok(result)
            }
            Err(e) => {
                error!(
                    operation,
                    query_id,
                    error = %e,
                    query = %redact(text),
                    "query failed"
                );
                Err(GuardError::Driver(e))
            }
        }
    }
}

/// Checks text against the dangerous-pattern rules
///
/// Returns the label of the first rule that fires, or `None` when the
/// text is acceptable. The WHERE-literal rule only applies to calls that
/// supplied zero parameters, so constant statements without a WHERE
/// clause (`SELECT 1`) pass.
pub fn match_dangerous_pattern(text: &str, param_count: usize) -> Option<&'static str> {
    for (label, pattern) in DANGEROUS_PATTERNS.iter() {
        if pattern.is_match(text) {
            return Some(label);
        }
    }

    if param_count == 0 && WHERE_LITERAL.is_match(text) {
        return Some("unparameterized-where-literal");
    }

    None
}

/// Enforces the placeholder-sequence invariant
///
/// Extracts the distinct `$N` tokens and requires them to form a
/// contiguous run `1..=N` with `N` equal to the supplied parameter count.
pub fn validate_placeholders(text: &str, param_count: usize) -> Result<(), GuardError> {
    let mut numbers: Vec<usize> = PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    numbers.sort_unstable();
    numbers.dedup();

    for (i, n) in numbers.iter().enumerate() {
        if *n != i + 1 {
            return Err(GuardError::InvalidParameterSequence);
        }
    }

    if numbers.len() != param_count {
        return Err(GuardError::ParameterCountMismatch {
            expected: numbers.len(),
            got: param_count,
        });
    }

    Ok(())
}

/// Combined pattern and placeholder validation, without audit or driver
///
/// The standalone form used by the CLI and by builder round-trip checks.
pub fn validate_statement(text: &str, param_count: usize) -> Result<(), GuardError> {
    if match_dangerous_pattern(text, param_count).is_some() {
        return Err(GuardError::DangerousPattern);
    }
    validate_placeholders(text, param_count)
}

/// Replaces placeholders with `?` for human-readable logs
///
/// Only the statement shape is ever logged; parameter values stay out of
/// the log stream entirely.
pub fn redact(text: &str) -> String {
    PLACEHOLDER.replace_all(text, "?").into_owned()
}
