use crate::error::ConnectorError;
use std::fmt;

/// NetSuite token-based authentication credentials.
///
/// Immutable for the lifetime of a run. Secrets are kept out of the `Debug`
/// output so they cannot leak through logging.
#[derive(Clone)]
pub struct Credentials {
    account: String,
    consumer_key: String,
    consumer_secret: String,
    token_id: String,
    token_secret: String,
}

impl Credentials {
    pub fn new(
        account: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_id: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Result<Self, ConnectorError> {
        let credentials = Self {
            account: account.into(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token_id: token_id.into(),
            token_secret: token_secret.into(),
        };

        for (name, value) in [
            ("account", &credentials.account),
            ("consumer_key", &credentials.consumer_key),
            ("consumer_secret", &credentials.consumer_secret),
            ("token_id", &credentials.token_id),
            ("token_secret", &credentials.token_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ConnectorError::Credentials(format!("{name} is empty")));
            }
        }

        Ok(credentials)
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub(crate) fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub(crate) fn token_secret(&self) -> &str {
        &self.token_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"[REDACTED]")
            .field("token_id", &self.token_id)
            .field("token_secret", &"[REDACTED]")
            .finish()
    }
}
