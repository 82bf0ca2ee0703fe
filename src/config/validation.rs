use crate::config::types::{
    ArchiveConfig, CacheConfig, Config, CrawlerConfig, FetchMode, ListingConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_cache_config(&config.cache)?;
    validate_listing_config(&config.listing, config.crawler.mode)?;
    validate_archive_config(&config.archive)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 64, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.base_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "base_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the listing sources for the selected mode
fn validate_listing_config(config: &ListingConfig, mode: FetchMode) -> Result<(), ConfigError> {
    validate_http_url("x64_url", &config.x64_url)?;
    validate_http_url("x86_url", &config.x86_url)?;

    if mode == FetchMode::Replay && (config.x64_file.is_none() || config.x86_file.is_none()) {
        return Err(ConfigError::Validation(
            "replay mode requires both x64_file and x86_file".to_string(),
        ));
    }

    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    validate_http_url("availability_url", &config.availability_url)?;
    validate_http_url("snapshot_prefix", &config.snapshot_prefix)?;

    if config.referer.is_empty() {
        return Err(ConfigError::Validation("referer cannot be empty".to_string()));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Checks that a configured endpoint is an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
