//! Journal records - Immutable history of processed activity entries
//!
//! The engine keeps one record per applied entry. Streak, count, and
//! time-window unlock conditions evaluate over this history, and the
//! processed-entry set backing idempotency is derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{EntryId, Sentiment};

/// A processed activity entry, kept permanently
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalRecord {
    pub entry_id: EntryId,
    pub recorded_at: DateTime<Utc>,
    pub sentiment: Sentiment,
}

impl JournalRecord {
    pub fn new(entry_id: EntryId, recorded_at: DateTime<Utc>, sentiment: Sentiment) -> Self {
        Self {
            entry_id,
            recorded_at,
            sentiment,
        }
    }
}
