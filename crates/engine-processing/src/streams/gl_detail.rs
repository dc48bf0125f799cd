use crate::query::StreamDef;
use chrono::NaiveDate;
use model::records::record::RawRecord;
use std::fmt::Write as _;
use tracing::warn;

/// General-ledger detail lines: one row per posting accounting line, joined
/// across the transaction, accounting-line and account tables.
///
/// The query orders by `t.ID` first; that column doubles as the chunk
/// re-anchoring boundary, so the ordering clause is load-bearing and must
/// not be edited casually.
pub struct GlDetailStream;

const STREAM_NAME: &str = "netsuite_general_ledger_detail";

const BASE_QUERY: &str = "\
SELECT
    t.ID AS internal_id,
    t.TranDate AS transaction_date,
    COALESCE(t.TranID, 'NULL') AS transaction_id,
    tal.TransactionLine AS trans_acct_line_id,
    BUILTIN.DF(t.PostingPeriod) AS posting_period,
    t.PostingPeriod AS posting_period_id,
    t.CreatedDateTime AS created_date,
    tal.LastModifiedDate AS trans_acct_line_last_modified,
    t.LastModifiedDate AS transaction_last_modified,
    a.LastModifiedDate AS account_last_modified,
    t.Posting AS posting,
    BUILTIN.DF(t.ApprovalStatus) AS approval,
    BUILTIN.DF(t.Entity) AS entity_name,
    t.Memo AS trans_memo,
    tl.Memo AS trans_line_memo,
    BUILTIN.DF(t.Type) AS transaction_type,
    tal.Account AS acct_id,
    a.Parent AS account_group,
    tl.Department AS department,
    tl.Class AS class,
    tl.Location AS location,
    tal.Debit AS debit,
    tal.Credit AS credit,
    tal.Amount AS net_amount,
    BUILTIN.DF(tl.Subsidiary) AS subsidiary,
    t.Number AS document_number,
    BUILTIN.DF(t.Status) AS status
FROM Transaction t
INNER JOIN TransactionAccountingLine tal ON (tal.Transaction = t.ID)
INNER JOIN Account a ON (a.ID = tal.Account)
LEFT JOIN TransactionLine tl ON (tl.Transaction = t.ID AND tl.ID = tal.TransactionLine)
WHERE (t.Posting = 'T')
  AND (tal.Posting = 'T')
  AND ((tal.Debit IS NOT NULL) OR (tal.Credit IS NOT NULL))";

const ORDER_CLAUSE: &str = " ORDER BY t.ID, t.TranDate, t.TranID, tal.TransactionLine";

impl StreamDef for GlDetailStream {
    fn name(&self) -> &str {
        STREAM_NAME
    }

    fn build_query(
        &self,
        min_internal_id: u64,
        last_modified_cutoff: Option<NaiveDate>,
    ) -> String {
        let mut query = String::from(BASE_QUERY);

        if min_internal_id > 0 {
            let _ = write!(query, " AND t.ID > {min_internal_id}");
        }

        if let Some(cutoff) = last_modified_cutoff {
            let date = cutoff.format("%Y-%m-%d");
            let _ = write!(
                query,
                " AND (t.LastModifiedDate >= TO_DATE('{date}', 'YYYY-MM-DD') \
                 OR tal.LastModifiedDate >= TO_DATE('{date}', 'YYYY-MM-DD') \
                 OR a.LastModifiedDate >= TO_DATE('{date}', 'YYYY-MM-DD'))"
            );
        }

        query.push_str(ORDER_CLAUSE);
        query
    }

    /// Drops rows that lost either half of their primary key; everything
    /// else passes through untouched apart from the `links` noise column
    /// SuiteQL appends to every row.
    fn prepare(&self, mut record: RawRecord) -> Option<RawRecord> {
        record.remove("links");

        if record.is_missing("internal_id") {
            warn!(
                trans_acct_line_id = record.get_str("trans_acct_line_id"),
                "Skipping record with missing internal_id"
            );
            return None;
        }
        if record.is_missing("trans_acct_line_id") {
            warn!(
                internal_id = record.get_str("internal_id"),
                "Skipping record with missing trans_acct_line_id"
            );
            return None;
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_refresh_query_has_no_id_filter() {
        let query = GlDetailStream.build_query(0, None);
        assert!(!query.contains("t.ID >"));
        assert!(query.ends_with(ORDER_CLAUSE));
    }

    #[test]
    fn chunked_query_filters_on_the_anchor_id() {
        let query = GlDetailStream.build_query(4711, None);
        assert!(query.contains("AND t.ID > 4711"));
        // The filter must come before the ordering clause.
        assert!(query.find("t.ID > 4711").unwrap() < query.find("ORDER BY").unwrap());
    }

    #[test]
    fn incremental_query_filters_all_three_modification_dates() {
        let cutoff = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let query = GlDetailStream.build_query(0, Some(cutoff));
        assert_eq!(query.matches("TO_DATE('2025-06-01', 'YYYY-MM-DD')").count(), 3);
        assert!(query.contains("tal.LastModifiedDate >="));
        assert!(query.contains("a.LastModifiedDate >="));
    }

    #[test]
    fn query_orders_by_the_internal_id_first() {
        let query = GlDetailStream.build_query(0, None);
        assert!(query.contains("ORDER BY t.ID,"));
    }

    #[test]
    fn prepare_drops_records_missing_either_key_half() {
        assert!(
            GlDetailStream
                .prepare(record(json!({"internal_id": "1", "trans_acct_line_id": ""})))
                .is_none()
        );
        assert!(
            GlDetailStream
                .prepare(record(json!({"trans_acct_line_id": "2"})))
                .is_none()
        );
        assert!(
            GlDetailStream
                .prepare(record(
                    json!({"internal_id": "1", "trans_acct_line_id": "2"})
                ))
                .is_some()
        );
    }

    #[test]
    fn prepare_strips_the_links_column() {
        let prepared = GlDetailStream
            .prepare(record(json!({
                "internal_id": "1",
                "trans_acct_line_id": "2",
                "links": [{"rel": "self"}]
            })))
            .unwrap();
        assert!(prepared.get("links").is_none());
    }
}
