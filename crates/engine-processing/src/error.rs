use connectors::error::ConnectorError;
use engine_core::error::{SettingsError, StateStoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Fetch at offset {offset} failed: {source}")]
    Fetch {
        offset: u64,
        #[source]
        source: ConnectorError,
    },

    #[error("Fetch at offset {offset} failed after retries: {source}")]
    RetriesExhausted {
        offset: u64,
        #[source]
        source: ConnectorError,
    },

    #[error("Fetch task was aborted before completing")]
    FetchTaskFailed,

    #[error("Record at a chunk boundary is missing ordering field '{0}'")]
    MissingOrderingField(String),

    #[error("Ordering field regressed from {previous} to {observed}; the resume point would be corrupted")]
    OrderingViolation { previous: u64, observed: u64 },

    #[error("Consumer rejected batch {number}: {message}")]
    Sink { number: u64, message: String },

    #[error(transparent)]
    State(#[from] StateStoreError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Failure raised by a batch consumer.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct SinkError(String);

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
