//! Failure classification for detail page fetches
//!
//! Recovery policy:
//!
//! | Failure | First attempt | Archive attempt |
//! |---------|---------------|-----------------|
//! | HTTP 503 | Archive fallback | Drop |
//! | Other HTTP status | Drop | Drop |
//! | DNS failure | Drop | Drop |
//! | Timeout | Drop | Drop |
//! | Anything else | Drop | Drop |

use crate::crawler::FetchFailure;

/// Which fetch of an entry failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The live detail page
    Live,
    /// The availability query or snapshot fetch of the archive fallback
    Archive,
}

/// A detail page to recover from the web archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackRequest {
    /// URL that answered 503
    pub original_url: String,

    /// Cache key the recovered page is stored under
    pub cache_key: String,

    /// Snapshot URL, once the archive has been asked for one
    pub snapshot_url: Option<String>,
}

impl FallbackRequest {
    pub fn new(original_url: impl Into<String>, cache_key: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            cache_key: cache_key.into(),
            snapshot_url: None,
        }
    }
}

/// What to do with a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    ArchiveFallback(FallbackRequest),
    /// Terminal for this entry
    Drop,
}

/// Decides whether a failed fetch is worth an archive fallback
///
/// Only a 503 on the live page qualifies. Failures during the fallback
/// itself are never retried again.
pub fn classify(failure: &FetchFailure, attempt: Attempt, cache_key: &str) -> Disposition {
    match (failure, attempt) {
        (FetchFailure::HttpStatus { status: 503, url }, Attempt::Live) => {
            Disposition::ArchiveFallback(FallbackRequest::new(url.as_str(), cache_key))
        }
        _ => Disposition::Drop,
    }
}
