use std::path::{Path, PathBuf};

const LISTING_DIR: &str = "driver_lists";
const DETAIL_DIR: &str = "driver_specs";

/// Where snapshots live under the cache root
///
/// Downstream tooling reads these paths directly:
/// - `<base>/driver_lists/nvidia-<page-token>.html`
/// - `<base>/driver_specs/<cache-key>.html`, the key being
///   `nvidia_<version>_<os>_<arch>`
#[derive(Debug, Clone)]
pub struct CacheLayout {
    base: PathBuf,
}

impl CacheLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn listing_dir(&self) -> PathBuf {
        self.base.join(LISTING_DIR)
    }

    pub fn detail_dir(&self) -> PathBuf {
        self.base.join(DETAIL_DIR)
    }

    /// Path of a listing page snapshot
    pub fn listing_path(&self, page_token: &str) -> PathBuf {
        self.listing_dir().join(format!("nvidia-{}.html", page_token))
    }

    /// Path of a detail page snapshot
    pub fn detail_path(&self, cache_key: &str) -> PathBuf {
        self.detail_dir().join(format!("{}.html", cache_key))
    }
}
