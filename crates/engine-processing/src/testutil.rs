//! Shared fakes for exercising the extraction pipeline without a network.

use crate::{
    error::SinkError,
    query::StreamDef,
    streamer::BatchSink,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use connectors::error::ConnectorError;
use engine_core::{
    error::StateStoreError,
    source::QuerySource,
    state::{StateStore, models::Bookmark},
};
use model::{
    pagination::page::Page,
    records::{batch::RecordBatch, record::RawRecord},
};
use serde_json::json;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

/// Stream whose query text just encodes the chunk's lower bound so the fake
/// source can interpret it.
pub struct TestStream;

impl StreamDef for TestStream {
    fn name(&self) -> &str {
        "test_stream"
    }

    fn build_query(&self, min_internal_id: u64, _cutoff: Option<NaiveDate>) -> String {
        format!("min:{min_internal_id}")
    }
}

/// Like [`TestStream`], but drops records missing `trans_acct_line_id`,
/// mirroring the GL detail validation rules.
pub struct ValidatingStream;

impl StreamDef for ValidatingStream {
    fn name(&self) -> &str {
        "validating_stream"
    }

    fn build_query(&self, min_internal_id: u64, _cutoff: Option<NaiveDate>) -> String {
        format!("min:{min_internal_id}")
    }

    fn prepare(&self, record: RawRecord) -> Option<RawRecord> {
        if record.is_missing("trans_acct_line_id") {
            return None;
        }
        Some(record)
    }
}

pub fn test_record(id: u64) -> RawRecord {
    serde_json::from_value(json!({
        "internal_id": id.to_string(),
        "trans_acct_line_id": "0",
    }))
    .unwrap()
}

pub fn record_ids(pages: &[Page]) -> Vec<u64> {
    pages
        .iter()
        .flat_map(|page| page.records.iter())
        .filter_map(|record| record.get_u64("internal_id"))
        .collect()
}

/// In-memory dataset of strictly increasing ids, served through the bounded
/// query protocol the reader speaks (`min:<id>` + offset + limit). Tracks
/// the peak number of concurrent fetches.
pub struct FakeSource {
    ids: Vec<u64>,
    delay: Duration,
    missing_line_id_every: Option<u64>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new(count: u64) -> Self {
        Self {
            ids: (1..=count).collect(),
            delay: Duration::from_millis(0),
            missing_line_id_every: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Adds per-fetch latency so concurrency bounds become observable.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every n-th record is emitted without its `trans_acct_line_id`.
    pub fn with_missing_line_id_every(mut self, every: u64) -> Self {
        self.missing_line_id_every = Some(every);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record_for(&self, id: u64) -> RawRecord {
        match self.missing_line_id_every {
            Some(every) if id % every == 0 => serde_json::from_value(json!({
                "internal_id": id.to_string(),
                "trans_acct_line_id": "",
            }))
            .unwrap(),
            _ => test_record(id),
        }
    }
}

#[async_trait]
impl QuerySource for FakeSource {
    async fn fetch_page(
        &self,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, ConnectorError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        let min: u64 = query
            .strip_prefix("min:")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let records: Vec<RawRecord> = self
            .ids
            .iter()
            .copied()
            .filter(|id| *id > min)
            .skip(offset as usize)
            .take(limit as usize)
            .map(|id| self.record_for(id))
            .collect();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Page::new(offset, records))
    }
}

/// Bookmark store that keeps the document in memory and counts writes.
#[derive(Default)]
pub struct MemoryStateStore {
    bookmark: Mutex<Option<Bookmark>>,
    saves: AtomicUsize,
}

impl MemoryStateStore {
    pub fn current(&self) -> Option<Bookmark> {
        self.bookmark.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<Option<Bookmark>, StateStoreError> {
        Ok(self.bookmark.lock().unwrap().clone())
    }

    async fn save(&self, bookmark: &Bookmark) -> Result<(), StateStoreError> {
        *self.bookmark.lock().unwrap() = Some(bookmark.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Sink that records every batch it accepts; optionally fails once the
/// accepted count reaches a limit, simulating a disconnected consumer.
pub struct RecordingSink {
    batches: Arc<Mutex<Vec<RecordBatch>>>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new(batches: Arc<Mutex<Vec<RecordBatch>>>) -> Self {
        Self {
            batches,
            fail_after: None,
        }
    }

    pub fn failing_after(mut self, accepted: usize) -> Self {
        self.fail_after = Some(accepted);
        self
    }
}

#[async_trait]
impl BatchSink for RecordingSink {
    async fn write_batch(
        &mut self,
        batch: RecordBatch,
        _total_batches: Option<u64>,
    ) -> Result<(), SinkError> {
        let mut accepted = self.batches.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if accepted.len() >= limit {
                return Err(SinkError::new("sink disconnected"));
            }
        }
        accepted.push(batch);
        Ok(())
    }
}
