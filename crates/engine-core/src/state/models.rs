use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicationMode {
    FullTable,
    Incremental,
}

/// Persisted progress marker; the source of truth for resume.
///
/// The field names are an on-disk contract: a bookmark written by an older
/// build must still load, so unknown fields are ignored and newer optional
/// fields default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub last_internal_id: u64,
    pub current_chunk: u64,
    pub current_batch: u64,
    pub records_processed: u64,
    pub replication_mode: ReplicationMode,
    pub sync_started: DateTime<Utc>,

    #[serde(default)]
    pub sync_completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_cutoff: Option<NaiveDate>,
}

impl Bookmark {
    pub fn start(mode: ReplicationMode, cutoff: Option<NaiveDate>) -> Self {
        Self {
            last_internal_id: 0,
            current_chunk: 0,
            current_batch: 0,
            records_processed: 0,
            replication_mode: mode,
            sync_started: Utc::now(),
            sync_completed: false,
            last_modified_cutoff: cutoff,
        }
    }

    /// Advances the resume point. `last_internal_id` never moves backwards.
    pub fn advance(&mut self, last_internal_id: u64, chunk: u64, batch: u64, records: u64) {
        self.last_internal_id = self.last_internal_id.max(last_internal_id);
        self.current_chunk = chunk;
        self.current_batch = batch;
        self.records_processed += records;
    }
}
