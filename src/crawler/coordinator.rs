//! Crawler coordinator: main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Loading the two listing pages (live or replayed) and snapshotting them
//! - Extracting driver entries and claiming their cache keys
//! - Running the per-entry pipeline concurrently
//! - Handing records to the sink and tallying statistics

use crate::cache::ContentCache;
use crate::config::{Config, FetchMode};
use crate::crawler::fallback::ArchiveResolver;
use crate::crawler::fetcher::{build_http_client, FetchFailure, Fetcher};
use crate::crawler::scheduler::FetchScheduler;
use crate::extract::{extract_listing, Arch, ArchivePage, DriverEntry};
use crate::output::{CrawlStats, RecordSink};
use crate::url::listing_page_token;
use crate::{CacheError, HarvestError};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a listing page could not be loaded
#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Failed to read listing snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive a page token from {0}")]
    NoPageToken(String),

    #[error("Invalid listing URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// One listing page to load
#[derive(Debug, Clone)]
struct ListingSource {
    arch: Arch,
    url: String,
    replay_file: Option<PathBuf>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    cache: ContentCache,
    fetcher: Fetcher,
    scheduler: FetchScheduler,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        let fetcher = Fetcher::new(client);
        let cache = ContentCache::new(&config.cache.base_path);
        let resolver = ArchiveResolver::new(fetcher.clone(), config.archive.clone());
        let scheduler = FetchScheduler::new(cache.clone(), fetcher.clone(), resolver);

        Ok(Self {
            config,
            cache,
            fetcher,
            scheduler,
        })
    }

    /// Runs the crawl, emitting every record into `sink`
    ///
    /// Only cache directory and sink failures abort the run. Listing pages
    /// and driver entries that fail are logged and skipped.
    pub async fn run(&self, sink: &mut dyn RecordSink) -> Result<CrawlStats, HarvestError> {
        tracing::info!(
            "Starting {} crawl, cache at {}",
            self.config.crawler.mode,
            self.cache.layout().base().display()
        );

        self.cache.prepare().await?;
        let mut stats = CrawlStats::default();

        let mut entries = Vec::new();
        for source in self.listing_sources() {
            let page = match self.load_listing(&source).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(
                        url = %source.url,
                        "Failed to load {} listing: {}",
                        source.arch.vendor_token(),
                        e
                    );
                    continue;
                }
            };
            stats.listing_pages += 1;

            for result in extract_listing(&page) {
                match result {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        stats.failed_entries += 1;
                        tracing::warn!(listing = %page.url, "Skipping listing entry: {}", e);
                    }
                }
            }
        }

        if stats.listing_pages == 0 {
            tracing::error!("No listing page could be loaded, nothing to crawl");
        }

        let entries = self.claim_unique(entries, &mut stats);
        stats.entries = entries.len() as u64;
        tracing::info!("Processing {} driver entries", stats.entries);

        let scheduler = &self.scheduler;
        let mut outcomes = stream::iter(entries)
            .map(|entry| async move {
                let result = scheduler.process(&entry).await;
                (entry, result)
            })
            .buffer_unordered(self.config.crawler.max_concurrent_fetches as usize);

        while let Some((entry, result)) = outcomes.next().await {
            match result {
                Ok(outcome) => {
                    stats.record_origin(outcome.origin);
                    for record in &outcome.records {
                        sink.emit(record)?;
                    }
                    stats.records += outcome.records.len() as u64;
                }
                Err(e) => {
                    stats.failed_entries += 1;
                    tracing::error!(
                        url = %entry.url,
                        filename = %entry.cache_key(),
                        category = e.category(),
                        "Dropping driver entry: {}",
                        e
                    );
                }
            }
        }

        sink.finish()?;

        tracing::info!(
            "Crawl completed: {} records from {} entries ({} cached, {} live, {} archived, {} failed)",
            stats.records,
            stats.entries,
            stats.cache_hits,
            stats.live_fetches,
            stats.archive_fallbacks,
            stats.failed_entries
        );

        Ok(stats)
    }

    /// Keeps the first entry per cache key
    fn claim_unique(&self, entries: Vec<DriverEntry>, stats: &mut CrawlStats) -> Vec<DriverEntry> {
        let mut claimed = HashSet::new();
        entries
            .into_iter()
            .filter(|entry| {
                let fresh = claimed.insert(entry.cache_key());
                if !fresh {
                    stats.duplicate_entries += 1;
                    tracing::debug!(
                        "Skipping {}: {} is already scheduled",
                        entry.url,
                        entry.cache_key()
                    );
                }
                fresh
            })
            .collect()
    }

    fn listing_sources(&self) -> [ListingSource; 2] {
        let listing = &self.config.listing;
        [
            ListingSource {
                arch: Arch::Amd64,
                url: listing.x64_url.clone(),
                replay_file: listing.x64_file.clone(),
            },
            ListingSource {
                arch: Arch::I386,
                url: listing.x86_url.clone(),
                replay_file: listing.x86_file.clone(),
            },
        ]
    }

    /// Loads one listing page and stores its snapshot
    async fn load_listing(&self, source: &ListingSource) -> Result<ArchivePage, ListingError> {
        let url = Url::parse(&source.url).map_err(|e| ListingError::InvalidUrl {
            url: source.url.clone(),
            source: e,
        })?;

        let (body, token) = match (self.config.crawler.mode, &source.replay_file) {
            (FetchMode::Replay, Some(file)) => {
                let path = self.config.resolve_replay_file(file);
                let body = tokio::fs::read(&path)
                    .await
                    .map_err(|e| ListingError::Read {
                        path: path.clone(),
                        source: e,
                    })?;
                let location = path.to_string_lossy();
                let token = listing_page_token(&location, true)
                    .ok_or_else(|| ListingError::NoPageToken(location.to_string()))?;
                (body, token)
            }
            _ => {
                let fetched = self.fetcher.get(&source.url, None).await?;
                let token = listing_page_token(&source.url, false)
                    .ok_or_else(|| ListingError::NoPageToken(source.url.clone()))?;
                (fetched.body, token)
            }
        };

        let snapshot = self.cache.write_listing(&token, &body).await?;
        tracing::info!(
            "Listing {} stored at {}",
            source.arch.vendor_token(),
            snapshot.display()
        );

        Ok(ArchivePage {
            url,
            arch: source.arch,
            content: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use gpu_driver_specs::config::load_config;
/// use gpu_driver_specs::crawler::run_crawl;
/// use gpu_driver_specs::output::MemorySink;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let mut sink = MemorySink::new();
/// let stats = run_crawl(config, &mut sink).await?;
/// println!("{} records", stats.records);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    sink: &mut dyn RecordSink,
) -> Result<CrawlStats, HarvestError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run(sink).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_sources_follow_config() {
        let mut config = Config::with_base_path("/tmp/drivers");
        config.listing.x64_file = Some(PathBuf::from("local/x64.html"));
        let coordinator = Coordinator::new(config).unwrap();

        let [x64, x86] = coordinator.listing_sources();
        assert_eq!(x64.arch, Arch::Amd64);
        assert_eq!(
            x64.url,
            "https://www.nvidia.com/en-us/drivers/unix/freebsd-x64-archive/"
        );
        assert_eq!(x64.replay_file, Some(PathBuf::from("local/x64.html")));
        assert_eq!(x86.arch, Arch::I386);
        assert_eq!(x86.replay_file, None);
    }

    #[test]
    fn test_claim_unique_counts_duplicates() {
        let coordinator = Coordinator::new(Config::with_base_path("/tmp/drivers")).unwrap();
        let entry = |url: &str, version: &str| DriverEntry {
            version: version.to_string(),
            os: "freebsd".to_string(),
            arch: crate::extract::EntryArch::Mapped(Arch::Amd64),
            release_date: "unknown".to_string(),
            url: url.to_string(),
        };

        let mut stats = CrawlStats::default();
        let unique = coordinator.claim_unique(
            vec![
                entry("https://a/1", "1.0"),
                entry("https://a/2", "2.0"),
                entry("https://b/1", "1.0"),
            ],
            &mut stats,
        );

        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].url, "https://a/1");
        assert_eq!(stats.duplicate_entries, 1);
    }
}
