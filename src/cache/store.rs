use crate::cache::CacheLayout;
use crate::CacheError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Disk-backed snapshot store for fetched pages
///
/// Detail snapshots are write-once: a key that already has a file is never
/// overwritten, so a cached page is fetched at most once across runs. Listing
/// snapshots are refreshed on every run. Bodies are stored byte for byte.
#[derive(Debug, Clone)]
pub struct ContentCache {
    layout: CacheLayout,
}

impl ContentCache {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            layout: CacheLayout::new(base),
        }
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Creates the snapshot directories if they do not exist yet
    pub async fn prepare(&self) -> CacheResult<()> {
        for dir in [self.layout.listing_dir(), self.layout.detail_dir()] {
            fs::create_dir_all(&dir).await.map_err(|source| CacheError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Reads a detail snapshot; `Ok(None)` is a cache miss
    pub async fn read_detail(&self, cache_key: &str) -> CacheResult<Option<Vec<u8>>> {
        let path = self.layout.detail_path(cache_key);
        match fs::read(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    /// Stores a detail snapshot unless one already exists
    ///
    /// Returns `Ok(false)` when the key was already present and nothing was
    /// written.
    pub async fn write_detail(&self, cache_key: &str, body: &[u8]) -> CacheResult<bool> {
        let path = self.layout.detail_path(cache_key);
        write_new(&path, body).await
    }

    /// Stores a listing snapshot, replacing the previous run's copy
    pub async fn write_listing(&self, page_token: &str, body: &[u8]) -> CacheResult<PathBuf> {
        let path = self.layout.listing_path(page_token);
        fs::write(&path, body)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

/// Publishes `body` at `path` unless a file is already there
///
/// The body is written to a sibling `.part` file first and hard-linked into
/// place only once it is complete, so a failed write never leaves a
/// truncated snapshot under the final name.
async fn write_new(path: &Path, body: &[u8]) -> CacheResult<bool> {
    let partial = partial_path(path);
    let result = publish(&partial, path, body).await;

    if let Err(e) = fs::remove_file(&partial).await {
        if e.kind() != ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", partial.display(), e);
        }
    }

    result
}

async fn publish(partial: &Path, path: &Path, body: &[u8]) -> CacheResult<bool> {
    let partial_error = |source| CacheError::Io {
        path: partial.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(partial).await.map_err(partial_error)?;
    file.write_all(body).await.map_err(partial_error)?;
    file.sync_all().await.map_err(partial_error)?;
    drop(file);

    match fs::hard_link(partial, path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(source) => Err(CacheError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}
