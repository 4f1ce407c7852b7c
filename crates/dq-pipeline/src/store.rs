//! Durable storage for saved questions
//!
//! Saves are append-only: every persist writes a new self-contained record
//! keyed by a second-resolution timestamp, and an existing record is never
//! overwritten. The backend sits behind `QueryStore` so the filesystem
//! layout can be swapped for an embedded database without touching the
//! pipeline. Durable records and the in-memory ledger stay independent;
//! a loaded record only re-enters a session through an explicit replay.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ledger::LedgerEntry;

/// Timestamp format used for record ids and the record's timestamp field
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// One durable record, self-contained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuery {
    pub timestamp: String,
    /// The natural-language question
    pub query: String,
    /// The generated SQL
    pub sql: String,
    pub insight: String,
}

/// Abstract store for saved questions
pub trait QueryStore: Send + Sync {
    /// Write the entry as a new record; never overwrites. Returns the
    /// record id.
    fn persist(&self, entry: &LedgerEntry) -> anyhow::Result<String>;

    /// Read every record, newest-first. A missing storage location is an
    /// empty list, not an error.
    fn load_all(&self) -> anyhow::Result<Vec<LedgerEntry>>;
}

/// Filesystem store: one pretty-printed JSON file per record
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Pick a record path that does not exist yet; two saves within the
    /// same second get numeric suffixes.
    fn fresh_path(&self, timestamp: &str) -> (PathBuf, String) {
        let base = format!("query_{}", timestamp);
        let mut candidate = self.dir.join(format!("{}.json", base));
        let mut suffix = 0;
        while candidate.exists() {
            suffix += 1;
            candidate = self.dir.join(format!("{}_{}.json", base, suffix));
        }
        let record_id = candidate
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&base)
            .to_string();
        (candidate, record_id)
    }
}

impl QueryStore for JsonFileStore {
    fn persist(&self, entry: &LedgerEntry) -> anyhow::Result<String> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = entry.created_at.format(TIMESTAMP_FORMAT).to_string();
        let (path, record_id) = self.fresh_path(&timestamp);

        let record = SavedQuery {
            timestamp,
            query: entry.question.clone(),
            sql: entry.sql.clone(),
            insight: entry.insight.clone(),
        };
        fs::write(&path, serde_json::to_string_pretty(&record)?)?;

        debug!(%record_id, path = %path.display(), "persisted saved query");
        Ok(record_id)
    }

    fn load_all(&self) -> anyhow::Result<Vec<LedgerEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let record: SavedQuery = match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|text| serde_json::from_str(&text).map_err(Into::into))
            {
                Ok(record) => record,
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable record");
                    continue;
                }
            };

            let created_at =
                match NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT) {
                    Ok(naive) => Utc.from_utc_datetime(&naive),
                    Err(error) => {
                        warn!(path = %path.display(), %error, "skipping record with bad timestamp");
                        continue;
                    }
                };

            entries.push(LedgerEntry {
                question: record.query,
                sql: record.sql,
                insight: record.insight,
                created_at,
            });
        }

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}
