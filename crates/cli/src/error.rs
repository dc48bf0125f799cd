use connectors::error::ConnectorError;
use engine_core::error::StateStoreError;
use engine_processing::error::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read a file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connector setup failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("State store error: {0}")]
    State(#[from] StateStoreError),

    #[error("Extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("No bookmark found at {0}")]
    NoBookmark(String),
}
