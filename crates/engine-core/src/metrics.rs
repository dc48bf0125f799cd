use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_extracted: AtomicU64,
    records_dropped: AtomicU64,
    pages_fetched: AtomicU64,
    batches_dispatched: AtomicU64,
    chunks_completed: AtomicU64,
    fetch_failures: AtomicU64,
}

/// Run-level counters, shared cheaply across the control task and fetches.
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub records_extracted: u64,
    pub records_dropped: u64,
    pub pages_fetched: u64,
    pub batches_dispatched: u64,
    pub chunks_completed: u64,
    pub fetch_failures: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_records(&self, count: u64) {
        self.inner
            .records_extracted
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_dropped(&self, count: u64) {
        self.inner
            .records_dropped
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_page(&self) {
        self.inner.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_batch(&self) {
        self.inner
            .batches_dispatched
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_chunk(&self) {
        self.inner.chunks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_fetch_failure(&self) {
        self.inner.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_extracted: self.inner.records_extracted.load(Ordering::Relaxed),
            records_dropped: self.inner.records_dropped.load(Ordering::Relaxed),
            pages_fetched: self.inner.pages_fetched.load(Ordering::Relaxed),
            batches_dispatched: self.inner.batches_dispatched.load(Ordering::Relaxed),
            chunks_completed: self.inner.chunks_completed.load(Ordering::Relaxed),
            fetch_failures: self.inner.fetch_failures.load(Ordering::Relaxed),
        }
    }
}
