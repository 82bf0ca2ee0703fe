//! Record sink trait and error types
//!
//! The crawl hands every extracted record to a sink. Records from different
//! detail pages arrive in no particular order.

use crate::extract::GpuRecord;
use thiserror::Error;

/// Errors that can occur while emitting records
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Consumer of extracted records
pub trait RecordSink {
    /// Accepts one record
    fn emit(&mut self, record: &GpuRecord) -> OutputResult<()>;

    /// Called once after the last record
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Sink that keeps every record in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<GpuRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: &GpuRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
