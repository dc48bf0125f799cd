use crate::{error::StateStoreError, state::models::Bookmark};
use async_trait::async_trait;

pub mod file_store;
pub mod models;

/// External store for the run's bookmark.
///
/// `save` must make the bookmark durable before it returns; a checkpoint the
/// process cannot read back after a crash is no checkpoint at all.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self) -> Result<Option<Bookmark>, StateStoreError>;

    async fn save(&self, bookmark: &Bookmark) -> Result<(), StateStoreError>;
}
