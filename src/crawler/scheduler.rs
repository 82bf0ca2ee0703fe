//! Per-entry fetch pipeline
//!
//! For one driver entry the scheduler:
//! - Serves the detail page from the content cache when it is there
//! - Otherwise fetches it live and stores it before extraction
//! - Routes a failed live fetch through the classifier and, for a 503, the
//!   archive fallback

use crate::cache::ContentCache;
use crate::crawler::classify::{classify, Attempt, Disposition, FallbackRequest};
use crate::crawler::fallback::ArchiveResolver;
use crate::crawler::fetcher::{Fetcher, FetchFailure};
use crate::extract::{extract_detail, DriverEntry, GpuRecord};
use crate::EntryError;

/// Where a detail page's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOrigin {
    /// Re-parsed from a snapshot written by an earlier fetch
    Cache,
    /// Fetched from the vendor site
    Live,
    /// Recovered from the web archive after a 503
    Archive,
}

/// Records extracted for one entry and how the page was obtained
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub origin: FetchOrigin,
    pub records: Vec<GpuRecord>,
}

/// Runs the cache / live / archive pipeline for driver entries
#[derive(Debug, Clone)]
pub struct FetchScheduler {
    cache: ContentCache,
    fetcher: Fetcher,
    resolver: ArchiveResolver,
}

impl FetchScheduler {
    pub fn new(cache: ContentCache, fetcher: Fetcher, resolver: ArchiveResolver) -> Self {
        Self {
            cache,
            fetcher,
            resolver,
        }
    }

    /// Produces the records of one entry
    ///
    /// A cache hit never touches the network. Every error returned here is
    /// terminal for this entry only.
    pub async fn process(&self, entry: &DriverEntry) -> Result<EntryOutcome, EntryError> {
        let cache_key = entry.cache_key();

        if let Some(body) = self.cache.read_detail(&cache_key).await? {
            tracing::debug!("Cache hit for {}", cache_key);
            return extract(&body, FetchOrigin::Cache);
        }

        tracing::debug!("Cache miss for {}, fetching {}", cache_key, entry.url);
        match self.fetcher.get(&entry.url, None).await {
            Ok(fetched) => self.store_and_extract(&cache_key, &fetched.body, FetchOrigin::Live).await,
            Err(failure) => self.recover(&cache_key, failure).await,
        }
    }

    /// Handles a failed live fetch
    async fn recover(
        &self,
        cache_key: &str,
        failure: FetchFailure,
    ) -> Result<EntryOutcome, EntryError> {
        let request = match classify(&failure, Attempt::Live, cache_key) {
            Disposition::ArchiveFallback(request) => request,
            Disposition::Drop => return Err(failure.into()),
        };

        tracing::warn!(
            "{} answered 503, trying the web archive for {}",
            request.original_url,
            cache_key
        );

        match self.fetch_from_archive(request).await {
            Ok(body) => self.store_and_extract(cache_key, &body, FetchOrigin::Archive).await,
            Err(failure) => match classify(&failure, Attempt::Archive, cache_key) {
                Disposition::Drop => Err(failure.into()),
                Disposition::ArchiveFallback(request) => {
                    tracing::warn!(
                        "Archive answered {} for {}, not retrying",
                        failure.category(),
                        request.original_url
                    );
                    Err(failure.into())
                }
            },
        }
    }

    async fn fetch_from_archive(&self, request: FallbackRequest) -> Result<Vec<u8>, FetchFailure> {
        let resolved = self.resolver.resolve(request).await?;
        let fetched = self.resolver.fetch_snapshot(&resolved).await?;
        Ok(fetched.body)
    }

    /// Writes a fetched body to the cache, then extracts from it
    async fn store_and_extract(
        &self,
        cache_key: &str,
        body: &[u8],
        origin: FetchOrigin,
    ) -> Result<EntryOutcome, EntryError> {
        if !self.cache.write_detail(cache_key, body).await? {
            tracing::debug!("Snapshot for {} already present, kept as is", cache_key);
        }
        extract(body, origin)
    }
}

fn extract(body: &[u8], origin: FetchOrigin) -> Result<EntryOutcome, EntryError> {
    let html = String::from_utf8_lossy(body);
    let records = extract_detail(&html)?;
    Ok(EntryOutcome { origin, records })
}
