use crate::{error::ExtractError, query::StreamDef};
use chrono::NaiveDate;
use engine_core::{
    config::ExtractSettings,
    retry::{RetryError, RetryPolicy},
    source::QuerySource,
};
use model::pagination::{page::Page, window::fanout_windows};
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Drives chunked, windowed page fetching across the remote API's offset
/// ceiling.
///
/// Within a chunk, offsets are fetched in fan-out windows of
/// `concurrency * 3`, at most `concurrency` in flight at once, and window
/// results are re-sorted by offset before they are handed out, so callers
/// observe pages exactly as a sequential scan of the remote dataset would.
/// A short or empty page ends the run; a chunk that runs out of offsets
/// with a full final page re-anchors a new chunk at the last record's
/// identifier, which is what defeats the fixed offset cap.
pub struct ChunkedReader {
    source: Arc<dyn QuerySource>,
    stream: Arc<dyn StreamDef>,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,

    page_size: u64,
    offset_ceiling: u64,
    window_len: usize,
    ordering_field: String,
    cutoff: Option<NaiveDate>,

    query: String,
    windows: VecDeque<Vec<u64>>,
    ready: VecDeque<Page>,
    min_internal_id: u64,
    chunk_last_id: Option<u64>,
    chunk_number: u64,
    exhausted: bool,
}

impl ChunkedReader {
    pub fn new(
        source: Arc<dyn QuerySource>,
        stream: Arc<dyn StreamDef>,
        settings: &ExtractSettings,
        start_internal_id: u64,
    ) -> Self {
        let retry = RetryPolicy::new(
            settings.max_fetch_attempts,
            Duration::from_millis(500),
            Duration::from_secs(10),
        );

        let mut reader = Self {
            source,
            stream,
            semaphore: Arc::new(Semaphore::new(settings.concurrency)),
            retry,
            page_size: settings.page_size,
            offset_ceiling: settings.offset_ceiling,
            window_len: settings.window_len(),
            ordering_field: settings.ordering_field.clone(),
            cutoff: settings.last_modified_cutoff,
            query: String::new(),
            windows: VecDeque::new(),
            ready: VecDeque::new(),
            min_internal_id: 0,
            chunk_last_id: None,
            chunk_number: 0,
            exhausted: false,
        };
        reader.start_chunk(start_internal_id);
        reader
    }

    /// Number of the chunk currently being read, starting at 1.
    pub fn current_chunk(&self) -> u64 {
        self.chunk_number
    }

    /// Ordering-field value of the last record fetched so far.
    pub fn last_seen_id(&self) -> Option<u64> {
        self.chunk_last_id
    }

    /// Returns the next page in dataset order, or `None` once a chunk has
    /// terminated on a short or empty page (the true end of the data).
    pub async fn next_page(&mut self) -> Result<Option<Page>, ExtractError> {
        loop {
            if let Some(page) = self.ready.pop_front() {
                return Ok(Some(page));
            }
            if self.exhausted {
                return Ok(None);
            }

            match self.windows.pop_front() {
                Some(offsets) => self.fetch_window(offsets).await?,
                None => self.reanchor()?,
            }
        }
    }

    fn start_chunk(&mut self, min_internal_id: u64) {
        self.min_internal_id = min_internal_id;
        self.chunk_number += 1;
        self.query = self.stream.build_query(min_internal_id, self.cutoff);
        self.windows = fanout_windows(self.offset_ceiling, self.page_size, self.window_len).into();
        info!(
            chunk = self.chunk_number,
            min_internal_id, "Starting chunk"
        );
    }

    /// The chunk consumed every offset up to the ceiling without seeing a
    /// short page, so more rows may exist past the cap. Continue from the
    /// last record's identifier instead of an offset the API would refuse.
    fn reanchor(&mut self) -> Result<(), ExtractError> {
        match self.chunk_last_id {
            Some(anchor) if anchor > self.min_internal_id => {
                info!(
                    chunk = self.chunk_number,
                    anchor, "Offset ceiling reached with a full page; re-anchoring"
                );
                self.start_chunk(anchor);
                Ok(())
            }
            Some(anchor) => Err(ExtractError::OrderingViolation {
                previous: self.min_internal_id,
                observed: anchor,
            }),
            None => {
                self.exhausted = true;
                Ok(())
            }
        }
    }

    /// Fetches one window of offsets concurrently, then restores dataset
    /// order by sorting on offset before queueing the pages.
    async fn fetch_window(&mut self, offsets: Vec<u64>) -> Result<(), ExtractError> {
        let mut tasks = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let semaphore = Arc::clone(&self.semaphore);
            let source = Arc::clone(&self.source);
            let retry = self.retry.clone();
            let query = self.query.clone();
            let limit = self.page_size;

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ExtractError::FetchTaskFailed)?;

                retry
                    .run(|| {
                        let source = Arc::clone(&source);
                        let query = query.clone();
                        async move { source.fetch_page(&query, offset, limit).await }
                    })
                    .await
                    .map_err(|err| match err {
                        RetryError::Fatal(source) => ExtractError::Fetch { offset, source },
                        RetryError::AttemptsExceeded(source) => {
                            ExtractError::RetriesExhausted { offset, source }
                        }
                    })
            }));
        }

        let mut pages = Vec::with_capacity(tasks.len());
        for task in futures::future::join_all(tasks).await {
            pages.push(task.map_err(|_| ExtractError::FetchTaskFailed)??);
        }
        pages.sort_by_key(|page| page.offset);

        for page in pages {
            if self.exhausted {
                // A short page earlier in this window already marked the end
                // of the dataset; results for later offsets are stale.
                debug!(offset = page.offset, "Discarding page past the end of the chunk");
                continue;
            }

            let short = page.is_short(self.page_size);
            if let Some(last) = page.last_record() {
                let id = last.get_u64(&self.ordering_field).ok_or_else(|| {
                    ExtractError::MissingOrderingField(self.ordering_field.clone())
                })?;
                if let Some(previous) = self.chunk_last_id {
                    if id < previous {
                        return Err(ExtractError::OrderingViolation {
                            previous,
                            observed: id,
                        });
                    }
                }
                self.chunk_last_id = Some(id);
            }

            if short {
                self.exhausted = true;
                self.windows.clear();
            }
            if !page.is_empty() {
                self.ready.push_back(page);
            }
        }

        Ok(())
    }
}
