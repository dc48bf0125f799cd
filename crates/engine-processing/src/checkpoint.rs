use crate::{error::ExtractError, streamer::Dispatch};
use chrono::NaiveDate;
use engine_core::state::{
    StateStore,
    models::{Bookmark, ReplicationMode},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the bookmark for one run: loads or creates it, advances it after
/// every dispatched batch, and persists it before the run moves on.
pub struct CheckpointManager {
    store: Arc<dyn StateStore>,
    bookmark: Bookmark,
}

impl CheckpointManager {
    /// Loads prior progress. An unfinished bookmark in the same replication
    /// mode resumes; anything else (none, finished, or a mode switch that
    /// changes the dataset) starts a fresh sync. The starting bookmark is
    /// written immediately so even a run that crashes before its first
    /// batch leaves a consistent document behind.
    pub async fn begin(
        store: Arc<dyn StateStore>,
        mode: ReplicationMode,
        cutoff: Option<NaiveDate>,
    ) -> Result<Self, ExtractError> {
        let bookmark = match store.load().await? {
            Some(prior) if !prior.sync_completed && prior.replication_mode == mode => {
                info!(
                    last_internal_id = prior.last_internal_id,
                    records = prior.records_processed,
                    "Resuming from bookmark"
                );
                prior
            }
            Some(_) => {
                info!("Previous sync finished or changed mode; starting fresh");
                Bookmark::start(mode, cutoff)
            }
            None => {
                info!("No bookmark found; starting from the beginning");
                Bookmark::start(mode, cutoff)
            }
        };

        let manager = Self { store, bookmark };
        manager.store.save(&manager.bookmark).await?;
        Ok(manager)
    }

    pub fn resume_id(&self) -> u64 {
        self.bookmark.last_internal_id
    }

    pub fn bookmark(&self) -> &Bookmark {
        &self.bookmark
    }

    /// Advances and persists the bookmark for one dispatched batch. The
    /// write completes before this returns, so the next fetch only starts
    /// once the progress it builds on is durable.
    pub async fn record_batch(
        &mut self,
        dispatch: &Dispatch,
        chunk: u64,
    ) -> Result<(), ExtractError> {
        let last_id = dispatch
            .last_internal_id
            .unwrap_or(self.bookmark.last_internal_id);
        self.bookmark
            .advance(last_id, chunk, dispatch.number, dispatch.records as u64);

        self.store.save(&self.bookmark).await?;
        Ok(())
    }

    pub async fn complete(&mut self) -> Result<(), ExtractError> {
        self.bookmark.sync_completed = true;
        self.store.save(&self.bookmark).await?;
        Ok(())
    }

    /// Best-effort write on the fatal path; the original error must win, so
    /// a store failure here is only logged.
    pub async fn write_final(&self) {
        if let Err(err) = self.store.save(&self.bookmark).await {
            warn!(error = %err, "Failed to write final checkpoint");
        }
    }
}
