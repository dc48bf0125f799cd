use model::records::record::RawRecord;
use serde::Deserialize;

/// Body of a successful SuiteQL query response.
///
/// The hypermedia noise in the payload (`links`, `offset`, `count`) is
/// ignored on deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    pub items: Vec<RawRecord>,

    #[serde(rename = "hasMore")]
    pub has_more: bool,

    #[serde(rename = "totalResults")]
    pub total_results: Option<u64>,

    /// Some deployments report application errors inside a 2xx body.
    pub error: Option<serde_json::Value>,
}
