//! Session ledger
//!
//! Ordered in-memory log of answered questions for the active session.
//! Entries are immutable once created; the dedup key is the trimmed
//! (question, sql) pair, so repeating an identical question does not grow
//! the ledger. Cleared with the session, never persisted automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded question/query/insight triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub question: String,
    pub sql: String,
    pub insight: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        question: impl Into<String>,
        sql: impl Into<String>,
        insight: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            sql: sql.into(),
            insight: insight.into(),
            created_at: Utc::now(),
        }
    }

    /// Dedup key: question and sql with surrounding whitespace trimmed
    fn key(&self) -> (&str, &str) {
        (self.question.trim(), self.sql.trim())
    }
}

/// In-memory log of the session's answered questions, newest-last
#[derive(Debug, Default)]
pub struct SessionLedger {
    entries: Vec<LedgerEntry>,
}

impl SessionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an entry with the same key already exists.
    /// Returns whether the entry was added.
    pub fn append(&mut self, entry: LedgerEntry) -> bool {
        if self.entries.iter().any(|e| e.key() == entry.key()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Entries newest-first, for display
    pub fn recent(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
