//! Crawl statistics
//!
//! Counters gathered by the coordinator while a crawl runs.

use crate::crawler::FetchOrigin;
use std::io::{self, Write};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Listing pages loaded and parsed
    pub listing_pages: u64,

    /// Distinct driver entries scheduled
    pub entries: u64,

    /// Entries skipped because another entry had the same cache key
    pub duplicate_entries: u64,

    /// Detail pages served from the content cache
    pub cache_hits: u64,

    /// Detail pages fetched from the vendor site
    pub live_fetches: u64,

    /// Detail pages recovered from the web archive
    pub archive_fallbacks: u64,

    /// Entries that produced no records because of an error
    pub failed_entries: u64,

    /// Records emitted
    pub records: u64,
}

impl CrawlStats {
    /// Counts a successfully processed entry by where its page came from
    pub fn record_origin(&mut self, origin: FetchOrigin) {
        match origin {
            FetchOrigin::Cache => self.cache_hits += 1,
            FetchOrigin::Live => self.live_fetches += 1,
            FetchOrigin::Archive => self.archive_fallbacks += 1,
        }
    }

    /// Network fetches of detail pages, live or archived
    pub fn network_fetches(&self) -> u64 {
        self.live_fetches + self.archive_fallbacks
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) -> io::Result<()> {
    write_statistics(&mut io::stdout().lock(), stats)
}

/// Writes the statistics summary to `out`
pub fn write_statistics(out: &mut impl Write, stats: &CrawlStats) -> io::Result<()> {
    writeln!(out, "=== Crawl Statistics ===\n")?;

    writeln!(out, "Overview:")?;
    writeln!(out, "  Listing pages: {}", stats.listing_pages)?;
    writeln!(out, "  Driver entries: {}", stats.entries)?;
    writeln!(out, "  Duplicate entries skipped: {}", stats.duplicate_entries)?;
    writeln!(out, "  Records emitted: {}", stats.records)?;
    writeln!(out)?;

    writeln!(out, "Detail pages:")?;
    writeln!(out, "  From cache: {}", stats.cache_hits)?;
    writeln!(out, "  Fetched live: {}", stats.live_fetches)?;
    writeln!(out, "  Recovered from archive: {}", stats.archive_fallbacks)?;
    writeln!(out, "  Failed: {}", stats.failed_entries)?;
    writeln!(out)?;

    let succeeded = stats.cache_hits + stats.network_fetches();
    let success_rate = if stats.entries > 0 {
        (succeeded as f64 / stats.entries as f64) * 100.0
    } else {
        0.0
    };

    writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} entries processed)",
        success_rate, succeeded, stats.entries
    )
}
