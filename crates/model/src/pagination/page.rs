use crate::records::record::RawRecord;

/// One fetched slice of up to `limit` records at a given offset.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub offset: u64,
    pub records: Vec<RawRecord>,
}

impl Page {
    pub fn new(offset: u64, records: Vec<RawRecord>) -> Self {
        Self { offset, records }
    }

    pub fn empty(offset: u64) -> Self {
        Self {
            offset,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A page with fewer records than the requested limit means the dataset
    /// has no rows past it, given rows are strictly ordered by the primary
    /// sort key.
    pub fn is_short(&self, limit: u64) -> bool {
        (self.records.len() as u64) < limit
    }

    pub fn last_record(&self) -> Option<&RawRecord> {
        self.records.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_empty_pages() {
        let full = Page::new(0, vec![RawRecord::default(); 3]);
        assert!(!full.is_short(3));
        assert!(full.is_short(4));
        assert!(Page::empty(10).is_short(1));
    }
}
