// src/ingest/sink.rs
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::ingest::error::{HarvestError, StorageError};
use crate::ingest::types::{Observer, Record, Sink};

#[derive(Serialize)]
struct StoredRecord<'a> {
    #[serde(flatten)]
    record: &'a Record,
    scraped_at: DateTime<Utc>,
}

/// Appends each record as one JSON line to `<dir>/<partition>.jsonl`.
pub struct JsonlSink {
    dir: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn partition_path(&self, partition: &str) -> PathBuf {
        self.dir.join(format!("{partition}.jsonl"))
    }
}

#[async_trait]
impl Sink for JsonlSink {
    async fn save(&self, partition: &str, record: &Record) -> Result<(), StorageError> {
        let mut line = serde_json::to_string(&StoredRecord {
            record,
            scraped_at: Utc::now(),
        })?;
        line.push('\n');

        let io_err = |source: std::io::Error| StorageError::Io {
            partition: partition.to_string(),
            source,
        };

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.partition_path(partition))
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}

// --- In-memory sink (tests, embedding) ---
#[derive(Default)]
pub struct MemorySink {
    pub saved: std::sync::Mutex<Vec<(String, Record)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far, even if a writer panicked.
    pub fn records(&self) -> Vec<(String, Record)> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn save(&self, partition: &str, record: &Record) -> Result<(), StorageError> {
        self.saved
            .lock()
            .map_err(|_| StorageError::Rejected("memory sink poisoned".into()))?
            .push((partition.to_string(), record.clone()));
        Ok(())
    }
}

/// Prints every record to stdout as a JSON line.
pub struct StdoutObserver;

impl Observer for StdoutObserver {
    fn on_record(&self, source: &str, keyword: &str, record: &Record) {
        let line = serde_json::json!({
            "source": source,
            "keyword": keyword,
            "title": record.title(),
            "price": record.price(),
            "link": record.link(),
        });
        println!("{line}");
    }
}

/// Emits every record as a tracing event.
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_record(&self, source: &str, keyword: &str, record: &Record) {
        tracing::info!(
            target: "harvest",
            source,
            keyword,
            title = record.title(),
            price = record.price(),
            link = record.link(),
            "record"
        );
    }

    fn on_failure(&self, source: &str, keyword: &str, error: &HarvestError) {
        tracing::debug!(target: "harvest", source, keyword, kind = error.kind(), "pair failed");
    }
}
