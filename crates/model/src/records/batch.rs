use crate::records::record::RawRecord;

/// A consumer-facing grouping of records, sized independently of page size.
///
/// Batches are handed to the sink callback atomically and released right
/// after, which is what bounds peak memory for multi-million row runs.
#[derive(Debug, Clone)]
pub struct RecordBatch {
    pub number: u64,
    pub label: String,
    pub records: Vec<RawRecord>,
}

impl RecordBatch {
    pub fn new(number: u64, label: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            number,
            label: label.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last_record(&self) -> Option<&RawRecord> {
        self.records.last()
    }
}
