use crate::error::SettingsError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for one extraction run.
///
/// `offset_ceiling` is the largest offset the remote query API will honor
/// before reporting "not found"; it drives the chunk re-anchoring scheme and
/// is configuration, not a constant baked into the pagination logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    pub page_size: u64,
    pub concurrency: usize,
    pub batch_size: usize,
    pub offset_ceiling: u64,
    pub request_timeout_secs: u64,
    pub ordering_field: String,

    /// Incremental mode: only rows modified on or after this date.
    pub last_modified_cutoff: Option<NaiveDate>,

    /// Upper bound on attempts per page fetch. 1 preserves the historical
    /// fail-fast behavior; higher values enable bounded retry with backoff
    /// for transient transport failures.
    pub max_fetch_attempts: usize,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            page_size: 1_000,
            concurrency: 5,
            batch_size: 100_000,
            offset_ceiling: 99_000,
            request_timeout_secs: 600,
            ordering_field: "internal_id".to_string(),
            last_modified_cutoff: None,
            max_fetch_attempts: 1,
        }
    }
}

impl ExtractSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.page_size == 0 {
            return Err(SettingsError::ZeroPageSize);
        }
        if self.concurrency == 0 {
            return Err(SettingsError::ZeroConcurrency);
        }
        if self.batch_size == 0 {
            return Err(SettingsError::ZeroBatchSize);
        }
        if self.ordering_field.trim().is_empty() {
            return Err(SettingsError::EmptyOrderingField);
        }
        Ok(())
    }

    /// Offsets fetched per fan-out window.
    pub fn window_len(&self) -> usize {
        self.concurrency * 3
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let settings = ExtractSettings::default();
        assert_eq!(settings.page_size, 1_000);
        assert_eq!(settings.concurrency, 5);
        assert_eq!(settings.batch_size, 100_000);
        assert_eq!(settings.offset_ceiling, 99_000);
        assert_eq!(settings.window_len(), 15);
        assert_eq!(settings.max_fetch_attempts, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let settings = ExtractSettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::ZeroPageSize)
        ));
    }

    #[test]
    fn settings_deserialize_with_partial_overrides() {
        let settings: ExtractSettings =
            serde_json::from_str(r#"{"page_size": 500, "concurrency": 3}"#).unwrap();
        assert_eq!(settings.page_size, 500);
        assert_eq!(settings.concurrency, 3);
        assert_eq!(settings.batch_size, 100_000);
    }
}
