use crate::{
    error::StateStoreError,
    state::{StateStore, models::Bookmark},
};
use async_trait::async_trait;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::io::AsyncWriteExt;

/// Bookmark store backed by a single JSON document on disk.
///
/// Writes go to a sibling temp file, are fsynced, then renamed over the
/// target, so a crash mid-write never truncates the previous bookmark.
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStateStore {
    async fn load(&self) -> Result<Option<Bookmark>, StateStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StateStoreError::Read(err.to_string())),
        };

        let bookmark = serde_json::from_slice(&bytes)?;
        Ok(Some(bookmark))
    }

    async fn save(&self, bookmark: &Bookmark) -> Result<(), StateStoreError> {
        let bytes = serde_json::to_vec_pretty(bookmark)?;
        let temp_path = self.temp_path();

        let mut file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|err| StateStoreError::Write(err.to_string()))?;
        file.write_all(&bytes)
            .await
            .map_err(|err| StateStoreError::Write(err.to_string()))?;
        file.sync_all()
            .await
            .map_err(|err| StateStoreError::Write(err.to_string()))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|err| StateStoreError::Write(err.to_string()))
    }
}
