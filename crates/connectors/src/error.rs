use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure (reset, refused, DNS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx status other than the not-found end-of-data sentinel.
    #[error("Remote API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A 2xx response whose body carries an error document instead of rows.
    #[error("Remote API returned an error payload: {0}")]
    ErrorPayload(String),

    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("Invalid credentials: {0}")]
    Credentials(String),
}

impl ConnectorError {
    /// Transient transport failures may be retried under an opt-in retry
    /// policy; every other variant is fatal for the run.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConnectorError::Timeout(_) | ConnectorError::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        assert!(ConnectorError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(ConnectorError::Transport("connection reset".into()).is_retryable());
        assert!(
            !ConnectorError::Api {
                status: 400,
                body: "bad query".into()
            }
            .is_retryable()
        );
        assert!(!ConnectorError::ErrorPayload("{}".into()).is_retryable());
        assert!(!ConnectorError::Decode("eof".into()).is_retryable());
    }
}
