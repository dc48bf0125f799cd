use async_trait::async_trait;
use connectors::{error::ConnectorError, netsuite::client::SuiteQlClient};
use model::pagination::page::Page;

/// Seam between the pagination controller and the remote query API.
///
/// Implementations execute one bounded query (query text + offset + limit)
/// and return the raw page; end-of-data beyond the valid offset range must
/// surface as an empty page, never as an error.
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn fetch_page(&self, query: &str, offset: u64, limit: u64)
    -> Result<Page, ConnectorError>;
}

#[async_trait]
impl QuerySource for SuiteQlClient {
    async fn fetch_page(
        &self,
        query: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Page, ConnectorError> {
        SuiteQlClient::fetch_page(self, query, offset, limit).await
    }
}
