use crate::{
    error::ConnectorError,
    netsuite::{auth::RequestSigner, credentials::Credentials, response::QueryResponse},
};
use model::pagination::page::Page;
use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use std::time::Duration;
use tracing::debug;

/// Executes bounded SuiteQL queries against one NetSuite account.
///
/// A single `reqwest::Client` (and its connection pool) is shared by every
/// fetch in a run; each request is signed individually.
pub struct SuiteQlClient {
    http: reqwest::Client,
    signer: RequestSigner,
    query_url: String,
    timeout: Duration,
}

impl SuiteQlClient {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, ConnectorError> {
        let base_url = format!(
            "https://{}.suitetalk.api.netsuite.com",
            credentials.account().to_lowercase().replace('_', "-")
        );
        Self::with_base_url(credentials, timeout, &base_url)
    }

    /// Builds a client against an explicit base URL. Exists for tests that
    /// point the fetcher at a local mock server.
    pub fn with_base_url(
        credentials: Credentials,
        timeout: Duration,
        base_url: &str,
    ) -> Result<Self, ConnectorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ConnectorError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            signer: RequestSigner::new(credentials),
            query_url: format!("{}/services/rest/query/v1/suiteql", base_url),
            timeout,
        })
    }

    pub fn account(&self) -> &str {
        self.signer.account()
    }

    /// Executes one bounded query and returns the page at `offset`.
    ///
    /// HTTP 404 is the API's way of reporting offsets past the valid range,
    /// so it maps to an empty page rather than an error.
    pub async fn fetch_page(
        &self,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, ConnectorError> {
        let limit_param = limit.to_string();
        let offset_param = offset.to_string();
        let authorization = self.signer.authorization_header(
            &self.query_url,
            &[("limit", &limit_param), ("offset", &offset_param)],
        );
        let url = format!("{}?limit={limit_param}&offset={offset_param}", self.query_url);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header("Prefer", "transient")
            .json(&serde_json::json!({ "q": query }))
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(offset, "Offset is past the end of the dataset");
            return Ok(Page::empty(offset));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: QueryResponse = response
            .json()
            .await
            .map_err(|err| ConnectorError::Decode(err.to_string()))?;

        if let Some(error) = payload.error {
            return Err(ConnectorError::ErrorPayload(error.to_string()));
        }

        debug!(offset, records = payload.items.len(), "Fetched page");
        Ok(Page::new(offset, payload.items))
    }

    fn transport_error(&self, err: reqwest::Error) -> ConnectorError {
        if err.is_timeout() {
            ConnectorError::Timeout(self.timeout)
        } else {
            ConnectorError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path, query_param},
    };

    fn client(server_url: &str) -> SuiteQlClient {
        let credentials = Credentials::new("acct", "ck", "cs", "tid", "ts").unwrap();
        SuiteQlClient::with_base_url(credentials, Duration::from_secs(5), server_url).unwrap()
    }

    #[tokio::test]
    async fn returns_records_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/rest/query/v1/suiteql"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "4"))
            .and(header("Prefer", "transient"))
            .and(body_partial_json(json!({"q": "SELECT 1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"internal_id": "5"}, {"internal_id": "6"}],
                "hasMore": false
            })))
            .mount(&server)
            .await;

        let page = client(&server.uri())
            .fetch_page("SELECT 1", 4, 2)
            .await
            .unwrap();
        assert_eq!(page.offset, 4);
        assert_eq!(page.len(), 2);
        assert_eq!(page.records[0].get_u64("internal_id"), Some(5));
    }

    #[tokio::test]
    async fn not_found_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let page = client(&server.uri()).fetch_page("q", 99_000, 10).await.unwrap();
        assert_eq!(page.offset, 99_000);
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid query"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).fetch_page("q", 0, 10).await.unwrap_err();
        match err {
            ConnectorError::Api { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid query");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(!matches!(
            client(&server.uri()).fetch_page("q", 0, 10).await.unwrap_err(),
            ConnectorError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn error_payload_in_success_body_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "SSS_INVALID_SRCH_QUERY"}
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri()).fetch_page("q", 0, 10).await.unwrap_err();
        assert!(matches!(err, ConnectorError::ErrorPayload(_)));
    }

    #[tokio::test]
    async fn every_request_carries_an_oauth_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        client(&server.uri()).fetch_page("q", 0, 10).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let auth = requests[0]
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(auth.starts_with(r#"OAuth realm="acct""#));
        assert!(auth.contains("oauth_signature="));
    }
}
