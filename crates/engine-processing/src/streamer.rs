use crate::error::{ExtractError, SinkError};
use async_trait::async_trait;
use model::records::{batch::RecordBatch, record::RawRecord};
use tracing::info;

/// Downstream consumer of batches, invoked synchronously by the streamer.
/// An error from the sink aborts the run after a final checkpoint write.
#[async_trait]
pub trait BatchSink: Send {
    async fn write_batch(
        &mut self,
        batch: RecordBatch,
        total_batches: Option<u64>,
    ) -> Result<(), SinkError>;
}

/// Metadata for one dispatched batch, reported back to the caller so the
/// checkpoint can advance.
#[derive(Debug, Clone, Copy)]
pub struct Dispatch {
    pub number: u64,
    pub records: usize,
    pub last_internal_id: Option<u64>,
}

/// Groups the ordered record stream into fixed-size batches.
///
/// Records accumulate until `batch_size` is reached, the full batch is
/// handed to the sink, and the buffer is released, so peak resident record
/// count stays proportional to `batch_size` no matter how large the run is.
pub struct BatchStreamer<K: BatchSink> {
    sink: K,
    buffer: Vec<RawRecord>,
    batch_size: usize,
    ordering_field: String,
    label: String,
    next_batch_number: u64,
}

impl<K: BatchSink> BatchStreamer<K> {
    pub fn new(
        sink: K,
        batch_size: usize,
        ordering_field: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            buffer: Vec::new(),
            batch_size,
            ordering_field: ordering_field.into(),
            label: label.into(),
            next_batch_number: 1,
        }
    }

    /// Appends records, dispatching a batch each time the accumulator
    /// reaches capacity. Returns the batches dispatched during this call.
    pub async fn push(&mut self, records: Vec<RawRecord>) -> Result<Vec<Dispatch>, ExtractError> {
        self.buffer.extend(records);

        let mut dispatched = Vec::new();
        while self.buffer.len() >= self.batch_size {
            let rest = self.buffer.split_off(self.batch_size);
            let full = std::mem::replace(&mut self.buffer, rest);
            dispatched.push(self.dispatch(full).await?);
        }
        Ok(dispatched)
    }

    /// Dispatches whatever remains in the accumulator at stream end.
    pub async fn flush(&mut self) -> Result<Option<Dispatch>, ExtractError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let remainder = std::mem::take(&mut self.buffer);
        Ok(Some(self.dispatch(remainder).await?))
    }

    async fn dispatch(&mut self, records: Vec<RawRecord>) -> Result<Dispatch, ExtractError> {
        let number = self.next_batch_number;
        self.next_batch_number += 1;

        let count = records.len();
        let last_internal_id = records
            .last()
            .and_then(|record| record.get_u64(&self.ordering_field));

        let batch = RecordBatch::new(number, self.label.clone(), records);
        self.sink
            .write_batch(batch, None)
            .await
            .map_err(|err| ExtractError::Sink {
                number,
                message: err.to_string(),
            })?;

        info!(batch = number, records = count, "Dispatched batch");
        Ok(Dispatch {
            number,
            records: count,
            last_internal_id,
        })
    }
}
