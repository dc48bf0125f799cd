use crate::error::CliError;
use async_trait::async_trait;
use engine_core::state::models::Bookmark;
use engine_processing::{error::SinkError, runner::RunSummary, streamer::BatchSink};
use model::records::batch::RecordBatch;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Streams batches as JSON lines, one record per line.
///
/// Stands in for the downstream warehouse loader: the engine guarantees
/// at-least-once delivery, and replays are deduplicated by primary key on
/// the consuming side.
pub struct JsonLinesSink {
    writer: Box<dyn Write + Send>,
}

impl JsonLinesSink {
    pub fn file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
        })
    }

    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }
}

#[async_trait]
impl BatchSink for JsonLinesSink {
    async fn write_batch(
        &mut self,
        batch: RecordBatch,
        _total_batches: Option<u64>,
    ) -> Result<(), SinkError> {
        for record in &batch.records {
            serde_json::to_writer(&mut self.writer, record.fields())
                .map_err(|err| SinkError::new(err.to_string()))?;
            self.writer
                .write_all(b"\n")
                .map_err(|err| SinkError::new(err.to_string()))?;
        }
        self.writer
            .flush()
            .map_err(|err| SinkError::new(err.to_string()))
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!("Sync summary");
    println!("-----------------------------");
    println!("{:<20} {}", "Records", summary.records_processed);
    println!("{:<20} {}", "Dropped records", summary.records_dropped);
    println!("{:<20} {}", "Pages", summary.pages_fetched);
    println!("{:<20} {}", "Batches", summary.batches_dispatched);
    println!("{:<20} {}", "Chunks", summary.chunks_completed);
    println!("{:<20} {}", "Last internal id", summary.last_internal_id);
}

pub fn print_bookmark(bookmark: &Bookmark, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(bookmark)?);
        return Ok(());
    }

    println!("Bookmark");
    println!("-----------------------------");
    println!("{:<20} {}", "Last internal id", bookmark.last_internal_id);
    println!("{:<20} {}", "Chunk", bookmark.current_chunk);
    println!("{:<20} {}", "Batch", bookmark.current_batch);
    println!("{:<20} {}", "Records", bookmark.records_processed);
    println!("{:<20} {:?}", "Mode", bookmark.replication_mode);
    println!("{:<20} {}", "Started", bookmark.sync_started.to_rfc3339());
    println!("{:<20} {}", "Completed", bookmark.sync_completed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::records::record::RawRecord;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(id: u64) -> RawRecord {
        serde_json::from_value(json!({"internal_id": id.to_string()})).unwrap()
    }

    #[tokio::test]
    async fn writes_one_json_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batches.jsonl");

        let mut sink = JsonLinesSink::file(&path).unwrap();
        sink.write_batch(
            RecordBatch::new(1, "gl", vec![record(1), record(2), record(3)]),
            None,
        )
        .await
        .unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["internal_id"], "1");
    }

    #[tokio::test]
    async fn appends_across_batches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batches.jsonl");

        let mut sink = JsonLinesSink::file(&path).unwrap();
        sink.write_batch(RecordBatch::new(1, "gl", vec![record(1)]), None)
            .await
            .unwrap();
        sink.write_batch(RecordBatch::new(2, "gl", vec![record(2)]), None)
            .await
            .unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
