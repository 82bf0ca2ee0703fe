//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use gpu_driver_specs::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Fetch mode: {}", config.crawler.mode);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    ArchiveConfig, CacheConfig, Config, CrawlerConfig, FetchMode, ListingConfig, UserAgentConfig,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
