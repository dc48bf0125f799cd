use crate::{
    checkpoint::CheckpointManager,
    chunk::ChunkedReader,
    error::ExtractError,
    query::StreamDef,
    streamer::{BatchSink, BatchStreamer},
};
use engine_core::{
    config::ExtractSettings,
    metrics::Metrics,
    source::QuerySource,
    state::{StateStore, models::ReplicationMode},
};
use std::sync::Arc;
use tracing::{error, info};

/// End-of-run totals reported to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub records_processed: u64,
    pub records_dropped: u64,
    pub pages_fetched: u64,
    pub batches_dispatched: u64,
    pub chunks_completed: u64,
    pub last_internal_id: u64,
}

/// Wires the pagination controller, batch streamer and checkpoint manager
/// into one extraction run.
pub struct ExtractionRun<K: BatchSink> {
    source: Arc<dyn QuerySource>,
    stream: Arc<dyn StreamDef>,
    store: Arc<dyn StateStore>,
    sink: K,
    settings: ExtractSettings,
    metrics: Metrics,
}

impl<K: BatchSink> ExtractionRun<K> {
    pub fn new(
        source: Arc<dyn QuerySource>,
        stream: Arc<dyn StreamDef>,
        store: Arc<dyn StateStore>,
        sink: K,
        settings: ExtractSettings,
    ) -> Self {
        Self {
            source,
            stream,
            store,
            sink,
            settings,
            metrics: Metrics::new(),
        }
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.clone()
    }

    pub async fn run(self) -> Result<RunSummary, ExtractError> {
        let Self {
            source,
            stream,
            store,
            sink,
            settings,
            metrics,
        } = self;

        settings.validate()?;

        let mode = match settings.last_modified_cutoff {
            Some(cutoff) => {
                info!(stream = stream.name(), %cutoff, "Starting incremental sync");
                ReplicationMode::Incremental
            }
            None => {
                info!(stream = stream.name(), "Starting full refresh sync");
                ReplicationMode::FullTable
            }
        };

        let mut checkpoints =
            CheckpointManager::begin(store, mode, settings.last_modified_cutoff).await?;
        let mut reader = ChunkedReader::new(
            source,
            Arc::clone(&stream),
            &settings,
            checkpoints.resume_id(),
        );
        let mut streamer = BatchStreamer::new(
            sink,
            settings.batch_size,
            settings.ordering_field.clone(),
            stream.name().to_string(),
        );

        let outcome = drive(
            &*stream,
            &metrics,
            &mut reader,
            &mut streamer,
            &mut checkpoints,
        )
        .await;

        match outcome {
            Ok(()) => {
                checkpoints.complete().await?;
                let snapshot = metrics.snapshot();
                info!(
                    records = snapshot.records_extracted,
                    dropped = snapshot.records_dropped,
                    batches = snapshot.batches_dispatched,
                    chunks = snapshot.chunks_completed,
                    "Sync completed"
                );
                Ok(RunSummary {
                    records_processed: snapshot.records_extracted,
                    records_dropped: snapshot.records_dropped,
                    pages_fetched: snapshot.pages_fetched,
                    batches_dispatched: snapshot.batches_dispatched,
                    chunks_completed: snapshot.chunks_completed,
                    last_internal_id: checkpoints.bookmark().last_internal_id,
                })
            }
            Err(err) => {
                if matches!(
                    err,
                    ExtractError::Fetch { .. } | ExtractError::RetriesExhausted { .. }
                ) {
                    metrics.add_fetch_failure();
                }
                error!(error = %err, "Run aborted; writing final checkpoint");
                checkpoints.write_final().await;
                Err(err)
            }
        }
    }
}

/// The single control task: pull ordered pages, validate records, stream
/// batches, checkpoint after every dispatch.
async fn drive<K: BatchSink>(
    stream: &dyn StreamDef,
    metrics: &Metrics,
    reader: &mut ChunkedReader,
    streamer: &mut BatchStreamer<K>,
    checkpoints: &mut CheckpointManager,
) -> Result<(), ExtractError> {
    let mut chunks_seen = reader.current_chunk();

    while let Some(page) = reader.next_page().await? {
        metrics.add_page();
        while chunks_seen < reader.current_chunk() {
            metrics.add_chunk();
            chunks_seen += 1;
        }

        let mut kept = Vec::with_capacity(page.len());
        for record in page.records {
            match stream.prepare(record) {
                Some(record) => kept.push(record),
                None => metrics.add_dropped(1),
            }
        }
        metrics.add_records(kept.len() as u64);

        for dispatch in streamer.push(kept).await? {
            metrics.add_batch();
            checkpoints
                .record_batch(&dispatch, reader.current_chunk())
                .await?;
        }
    }

    if let Some(dispatch) = streamer.flush().await? {
        metrics.add_batch();
        checkpoints
            .record_batch(&dispatch, reader.current_chunk())
            .await?;
    }
    metrics.add_chunk();

    Ok(())
}
