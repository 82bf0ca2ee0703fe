use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Main configuration structure for a harvest run
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Where listing pages come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Fetch the listing pages from the vendor site
    #[default]
    Live,
    /// Read the listing pages from local snapshot files
    Replay,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Replay => write!(f, "replay"),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Live network fetch or local-file replay for the listing pages
    #[serde(default)]
    pub mode: FetchMode,

    /// Maximum number of driver entries processed at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout of the fetch layer (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            max_concurrent_fetches: default_max_concurrent(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// Content cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Root directory holding `driver_lists/` and `driver_specs/`
    #[serde(rename = "base-path")]
    pub base_path: PathBuf,
}

/// The two archive listing pages, live and replayed
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(rename = "x64-url", default = "default_x64_url")]
    pub x64_url: String,

    #[serde(rename = "x86-url", default = "default_x86_url")]
    pub x86_url: String,

    /// Local snapshot of the x64 listing, used in replay mode
    #[serde(rename = "x64-file", default)]
    pub x64_file: Option<PathBuf>,

    /// Local snapshot of the x86 listing, used in replay mode
    #[serde(rename = "x86-file", default)]
    pub x86_file: Option<PathBuf>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            x64_url: default_x64_url(),
            x86_url: default_x86_url(),
            x64_file: None,
            x86_file: None,
        }
    }
}

/// Web-archive endpoints used when a detail page answers 503
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Availability query endpoint (answers with `last_ts`)
    #[serde(rename = "availability-url", default = "default_availability_url")]
    pub availability_url: String,

    /// Prefix that snapshot URLs are built from
    #[serde(rename = "snapshot-prefix", default = "default_snapshot_prefix")]
    pub snapshot_prefix: String,

    /// Referer header the archive service insists on
    #[serde(default = "default_referer")]
    pub referer: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            availability_url: default_availability_url(),
            snapshot_prefix: default_snapshot_prefix(),
            referer: default_referer(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Config {
    /// Builds a configuration with defaults for everything but the cache root
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            cache: CacheConfig {
                base_path: base_path.into(),
            },
            listing: ListingConfig::default(),
            archive: ArchiveConfig::default(),
            user_agent: UserAgentConfig::default(),
        }
    }

    /// Resolves a replay file against the cache root when it is relative
    pub fn resolve_replay_file(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.cache.base_path.join(file)
        }
    }
}

fn default_max_concurrent() -> u32 {
    8
}

fn default_timeout() -> u64 {
    30
}

fn default_x64_url() -> String {
    "https://www.nvidia.com/en-us/drivers/unix/freebsd-x64-archive/".to_string()
}

fn default_x86_url() -> String {
    "https://www.nvidia.com/en-us/drivers/unix/freebsd-archive/".to_string()
}

fn default_availability_url() -> String {
    "https://web.archive.org/__wb/sparkline".to_string()
}

fn default_snapshot_prefix() -> String {
    "https://web.archive.org/web".to_string()
}

fn default_referer() -> String {
    "https://web.archive.org/web/2015*/https://www.nvidia.com/object/frds86-313.18-driver"
        .to_string()
}

fn default_crawler_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
