use chrono::NaiveDate;
use model::records::record::RawRecord;

/// A stream definition: the bounded-query builder plus per-record
/// preparation for one remote table.
///
/// `build_query` must order rows by a stable, strictly increasing row
/// identifier as the primary sort key. Identifier-based chunking and the
/// checkpoint's resume point both depend on that ordering.
pub trait StreamDef: Send + Sync {
    fn name(&self) -> &str;

    /// Builds the query for one chunk. `min_internal_id == 0` means "from
    /// the beginning"; a positive value restricts the result set to rows
    /// with a strictly greater identifier.
    fn build_query(&self, min_internal_id: u64, last_modified_cutoff: Option<NaiveDate>)
    -> String;

    /// Validates and normalizes one raw record. Returning `None` drops the
    /// record (the implementation logs why); a dropped record never aborts
    /// the batch or the run.
    fn prepare(&self, record: RawRecord) -> Option<RawRecord> {
        Some(record)
    }
}
