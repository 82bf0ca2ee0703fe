//! Web-archive fallback for detail pages the vendor no longer serves

use crate::config::ArchiveConfig;
use crate::crawler::classify::FallbackRequest;
use crate::crawler::fetcher::{Fetched, Fetcher, FetchFailure};
use crate::url::{availability_query_url, snapshot_url};
use serde_json::Value;

/// Finds and fetches the latest archived snapshot of a page
#[derive(Debug, Clone)]
pub struct ArchiveResolver {
    fetcher: Fetcher,
    config: ArchiveConfig,
}

impl ArchiveResolver {
    pub fn new(fetcher: Fetcher, config: ArchiveConfig) -> Self {
        Self { fetcher, config }
    }

    /// Asks the archive for the latest capture of the original URL
    ///
    /// The returned request carries the snapshot URL.
    pub async fn resolve(&self, request: FallbackRequest) -> Result<FallbackRequest, FetchFailure> {
        let query = availability_query_url(&self.config.availability_url, &request.original_url)
            .map_err(|e| FetchFailure::Other {
                url: self.config.availability_url.clone(),
                message: e.to_string(),
            })?;

        let response = self
            .fetcher
            .get(query.as_str(), Some(&self.config.referer))
            .await?;

        let last_ts = parse_last_ts(&response.body).ok_or_else(|| FetchFailure::Other {
            url: query.to_string(),
            message: "availability response has no last_ts".to_string(),
        })?;

        let snapshot = snapshot_url(&self.config.snapshot_prefix, &last_ts, &request.original_url);
        tracing::debug!(
            "Archive capture {} found for {}",
            last_ts,
            request.original_url
        );

        Ok(FallbackRequest {
            snapshot_url: Some(snapshot),
            ..request
        })
    }

    /// Fetches the snapshot of a resolved request
    pub async fn fetch_snapshot(&self, request: &FallbackRequest) -> Result<Fetched, FetchFailure> {
        let url = request
            .snapshot_url
            .as_deref()
            .ok_or_else(|| FetchFailure::Other {
                url: request.original_url.clone(),
                message: "fallback request was never resolved".to_string(),
            })?;

        self.fetcher.get(url, Some(&self.config.referer)).await
    }
}

/// Reads the `last_ts` token of an availability response
fn parse_last_ts(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("last_ts")? {
        Value::String(ts) if !ts.is_empty() => Some(ts.clone()),
        Value::Number(ts) => Some(ts.to_string()),
        _ => None,
    }
}
