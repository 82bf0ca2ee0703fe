//! Output module for emitted records and crawl statistics
//!
//! This module handles:
//! - Handing extracted records to a sink
//! - Writing records as JSON Lines
//! - Recording crawl statistics

mod jsonl;
pub mod stats;
mod traits;

pub use jsonl::JsonLinesSink;
pub use stats::{print_statistics, write_statistics, CrawlStats};
pub use traits::{MemorySink, OutputError, OutputResult, RecordSink};
