use crate::error::CliError;
use connectors::{error::ConnectorError, netsuite::credentials::Credentials};
use engine_core::config::ExtractSettings;
use serde::Deserialize;

/// Job configuration document, loaded from a JSON file.
///
/// Credential fields may be left empty in the file and supplied through
/// `NETSUITE_*` environment variables instead, so secrets can stay out of
/// version-controlled configs.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub account: String,

    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub token_secret: String,

    #[serde(default)]
    pub settings: ExtractSettings,
}

impl JobConfig {
    pub async fn load(path: &str) -> Result<Self, CliError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn credentials(&self) -> Result<Credentials, ConnectorError> {
        Credentials::new(
            self.account.clone(),
            resolve(&self.consumer_key, "NETSUITE_CONSUMER_KEY"),
            resolve(&self.consumer_secret, "NETSUITE_CONSUMER_SECRET"),
            resolve(&self.token_id, "NETSUITE_TOKEN_ID"),
            resolve(&self.token_secret, "NETSUITE_TOKEN_SECRET"),
        )
    }
}

fn resolve(value: &str, env_key: &str) -> String {
    if !value.trim().is_empty() {
        return value.to_string();
    }
    std::env::var(env_key).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_config_with_default_settings() {
        let config: JobConfig = serde_json::from_str(
            r#"{
                "account": "1234567",
                "consumer_key": "ck",
                "consumer_secret": "cs",
                "token_id": "tid",
                "token_secret": "ts"
            }"#,
        )
        .unwrap();

        assert_eq!(config.account, "1234567");
        assert_eq!(config.settings.page_size, 1_000);
        assert_eq!(config.settings.offset_ceiling, 99_000);
        assert!(config.credentials().is_ok());
    }

    #[test]
    fn settings_overrides_apply() {
        let config: JobConfig = serde_json::from_str(
            r#"{
                "account": "1234567",
                "consumer_key": "ck",
                "consumer_secret": "cs",
                "token_id": "tid",
                "token_secret": "ts",
                "settings": {"page_size": 500, "concurrency": 8, "last_modified_cutoff": "2025-06-01"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.settings.page_size, 500);
        assert_eq!(config.settings.concurrency, 8);
        assert!(config.settings.last_modified_cutoff.is_some());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let config: JobConfig = serde_json::from_str(r#"{"account": "1234567"}"#).unwrap();
        // No file values and no env fallback set for these keys.
        assert!(config.credentials().is_err());
    }
}
