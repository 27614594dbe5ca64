//! Bounded in-memory history of blocked queries
//!
//! Every statement the guard rejects for a dangerous pattern is recorded
//! here, with the matched rule and a redacted copy of the text. The
//! history is diagnostic only: it never influences whether a request
//! succeeds, and it is capped so a probing attacker cannot grow process
//! memory.
//!
//! There is deliberately no global instance. Callers construct a
//! `QueryAudit`, share it via `Arc`, and inject it into each guard, which
//! keeps tests isolated and leaves room for sharded counters if the
//! process ever becomes truly parallel on this path.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Maximum number of blocked queries retained in history
const MAX_HISTORY: usize = 100;

/// Number of recent entries returned by [`QueryAudit::stats`]
const RECENT_ENTRIES: usize = 10;

/// One blocked query, as retained for diagnostics
///
/// The query text is redacted (placeholders replaced with `?`, parameter
/// values never captured) before it reaches this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousQuery {
    /// Redacted statement text
    pub redacted_query: String,
    /// Label of the detection rule that fired
    pub matched_rule: String,
    /// Unix timestamp in milliseconds when the block happened
    pub detected_at_ms: u64,
    /// Number of parameters supplied with the blocked statement
    pub param_count: usize,
}

/// Snapshot returned by the stats accessor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    /// Total queries blocked since this audit was created
    pub total_blocked: u64,
    /// Most recent entries, newest first
    pub recent: Vec<SuspiciousQuery>,
    /// Timestamp of the last block, if any
    pub last_detected_ms: Option<u64>,
}

/// Shared, bounded record of blocked queries
#[derive(Debug, Default)]
pub struct QueryAudit {
    history: Mutex<VecDeque<SuspiciousQuery>>,
    total: AtomicU64,
}

impl QueryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a blocked query to the history
    ///
    /// The oldest entry is evicted once the cap is reached. A poisoned
    /// lock is recovered rather than propagated; losing a diagnostic
    /// entry must never fail a request.
    pub fn record(&self, redacted_query: String, matched_rule: &str, param_count: usize) {
        let entry = SuspiciousQuery {
            redacted_query,
            matched_rule: matched_rule.to_string(),
            detected_at_ms: now_ms(),
            param_count,
        };

        self.total.fetch_add(1, Ordering::Relaxed);

        let mut history = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if history.len() == MAX_HISTORY {
            history.pop_front();
        }
        history.push_back(entry);
    }

    /// Returns the blocked-query totals and the most recent entries
    pub fn stats(&self) -> AuditStats {
        let history = self
            .history
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let recent: Vec<SuspiciousQuery> = history
            .iter()
            .rev()
            .take(RECENT_ENTRIES)
            .cloned()
            .collect();

        AuditStats {
            total_blocked: self.total.load(Ordering::Relaxed),
            last_detected_ms: recent.first().map(|e| e.detected_at_ms),
            recent,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_reports_stats() {
        let audit = QueryAudit::new();
        audit.record("SELECT * FROM ads WHERE id = ?".to_string(), "line-comment", 1);

        let stats = audit.stats();
        assert_eq!(stats.total_blocked, 1);
        assert_eq!(stats.recent.len(), 1);
        assert_eq!(stats.recent[0].matched_rule, "line-comment");
        assert!(stats.last_detected_ms.is_some());
    }

    #[test]
    fn history_is_bounded() {
        let audit = QueryAudit::new();
        for i in 0..250 {
            audit.record(format!("q{}", i), "union-select", 0);
        }

        let stats = audit.stats();
        // Total keeps counting even after eviction
        assert_eq!(stats.total_blocked, 250);
        // Only the most recent entries come back, newest first
        assert_eq!(stats.recent.len(), 10);
        assert_eq!(stats.recent[0].redacted_query, "q249");
        assert_eq!(stats.recent[9].redacted_query, "q240");
    }

    #[test]
    fn empty_audit_has_no_last_detection() {
        let stats = QueryAudit::new().stats();
        assert_eq!(stats.total_blocked, 0);
        assert!(stats.recent.is_empty());
        assert!(stats.last_detected_ms.is_none());
    }
}
