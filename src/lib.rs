//! gpu-driver-specs: a harvester for legacy GPU driver metadata
//!
//! This crate crawls the vendor's FreeBSD driver archive, follows each listed
//! driver to its detail page and emits one record per supported GPU. Detail
//! pages are cached on disk so a page is fetched at most once, and pages the
//! vendor no longer serves are recovered from web-archive snapshots.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod url;

use thiserror::Error;

pub use crawler::FetchFailure;

/// Main error type for crawl-level operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while turning page markup into driver data
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing field '{0}' in driver specification")]
    MissingField(String),

    #[error("Unmapped architecture '{0}'")]
    ArchitectureUnmapped(String),

    #[error("Malformed table: {0}")]
    MalformedTable(String),

    #[error("Malformed listing entry: {0}")]
    MalformedEntry(String),

    #[error("Invalid release date '{value}': {source}")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },
}

/// Errors raised by the on-disk content cache
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

/// Why a single driver entry produced no records
///
/// None of these abort the crawl; they are logged against the entry and the
/// remaining entries carry on.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl EntryError {
    /// Short category label used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            Self::Fetch(failure) => failure.category(),
            Self::Extract(ExtractError::MissingField(_)) => "MISSING_FIELD",
            Self::Extract(ExtractError::ArchitectureUnmapped(_)) => "ARCHITECTURE_UNMAPPED",
            Self::Extract(ExtractError::MalformedTable(_)) => "MALFORMED_TABLE",
            Self::Extract(ExtractError::MalformedEntry(_)) => "MALFORMED_ENTRY",
            Self::Extract(ExtractError::InvalidDate { .. }) => "INVALID_DATE",
            Self::Cache(_) => "CACHE_IO",
        }
    }
}

/// Result type alias for crawl-level operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::{Config, FetchMode};
pub use crawler::{crawl, Coordinator};
pub use extract::{Arch, DriverEntry, GpuRecord};
