//! Crawler module for the driver archive
//!
//! This module contains the crawl orchestration, including:
//! - HTTP fetching with failure classification
//! - The 503 to web-archive recovery path
//! - The per-entry cache / fetch / extract pipeline
//! - Overall crawl coordination

mod classify;
mod coordinator;
mod fallback;
mod fetcher;
mod scheduler;

pub use classify::{classify, Attempt, Disposition, FallbackRequest};
pub use coordinator::{run_crawl, Coordinator, ListingError};
pub use fallback::ArchiveResolver;
pub use fetcher::{build_http_client, FetchFailure, Fetched, Fetcher};
pub use scheduler::{EntryOutcome, FetchOrigin, FetchScheduler};

use crate::config::Config;
use crate::output::{CrawlStats, RecordSink};
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Prepare the cache directories
/// 2. Load and snapshot both listing pages
/// 3. Extract driver entries and drop duplicate cache keys
/// 4. Serve each detail page from cache, the vendor site or the web archive
/// 5. Emit one record per GPU into `sink`
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed; failed entries are counted, not fatal
/// * `Err(HarvestError)` - The cache or the sink failed
pub async fn crawl(config: Config, sink: &mut dyn RecordSink) -> Result<CrawlStats, HarvestError> {
    run_crawl(config, sink).await
}
