use std::{
    collections::VecDeque,
    sync::{PoisonError, RwLock},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 8 MB limit for history buffer
const HISTORY_BYTES: usize = 8 * 1024 * 1024;

/// A single log entry captured from tracing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    /// Log level: "TRACE", "DEBUG", "INFO", "WARN", "ERROR"
    pub level: String,
    /// Module path (e.g., "services::services::domain_events::handlers::submit")
    pub target: String,
    /// Platform job the event was recorded for, when the log call carried a `job_id` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub message: String,
}

impl EventLogEntry {
    /// Approximate size in bytes for memory accounting.
    pub fn approx_bytes(&self) -> usize {
        const OVERHEAD: usize = 32;
        OVERHEAD
            + self.level.len()
            + self.target.len()
            + self.job_id.as_ref().map_or(0, String::len)
            + self.message.len()
    }
}

#[derive(Clone)]
struct StoredEntry {
    entry: EventLogEntry,
    bytes: usize,
}

struct Inner {
    history: VecDeque<StoredEntry>,
    total_bytes: usize,
    limit_bytes: usize,
}

/// In-memory store for captured log entries.
///
/// Keeps a byte-bounded history; oldest entries are evicted first.
pub struct EventLogStore {
    inner: RwLock<Inner>,
}

impl Default for EventLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLogStore {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_BYTES)
    }

    pub fn with_limit(limit_bytes: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                history: VecDeque::with_capacity(32),
                total_bytes: 0,
                limit_bytes,
            }),
        }
    }

    /// Push a log entry to the store, evicting oldest entries if over limit.
    pub fn push(&self, entry: EventLogEntry) {
        let bytes = entry.approx_bytes();

        // A poisoned lock only means another writer panicked mid-push; the
        // buffer itself is still usable.
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        while inner.total_bytes.saturating_add(bytes) > inner.limit_bytes {
            if let Some(front) = inner.history.pop_front() {
                inner.total_bytes = inner.total_bytes.saturating_sub(front.bytes);
            } else {
                break;
            }
        }
        inner.history.push_back(StoredEntry { entry, bytes });
        inner.total_bytes = inner.total_bytes.saturating_add(bytes);
    }

    /// Returns at most `limit` of the newest entries, optionally only those
    /// recorded for `job_id`. Oldest first.
    pub fn recent(&self, job_id: Option<&str>, limit: usize) -> Vec<EventLogEntry> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<EventLogEntry> = inner
            .history
            .iter()
            .rev()
            .filter(|s| match job_id {
                Some(id) => s.entry.job_id.as_deref() == Some(id),
                None => true,
            })
            .take(limit)
            .map(|s| s.entry.clone())
            .collect();
        entries.reverse();
        entries
    }
}
