use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("page_size must be greater than zero")]
    ZeroPageSize,

    #[error("concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("batch_size must be greater than zero")]
    ZeroBatchSize,

    #[error("ordering_field must not be empty")]
    EmptyOrderingField,
}

#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Failed to read bookmark: {0}")]
    Read(String),

    #[error("Failed to persist bookmark: {0}")]
    Write(String),

    #[error("Bookmark document is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
