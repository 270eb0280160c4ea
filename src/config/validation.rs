use crate::config::policy::PolicyTable;
use crate::config::types::{Config, DomainConfig, OutputConfig};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
///
/// Every domain's resolved policy is checked, so a bad override fails here
/// rather than mid-crawl.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_domains(&config.crawl.domains)?;
    validate_output_config(&config.output)?;

    for host in config.overrides.keys() {
        validate_domain_string(host)?;
    }

    let table = PolicyTable::from_config(config);
    validate_domain_config("defaults", table.base())?;
    for domain in &config.crawl.domains {
        validate_domain_config(domain, &table.resolve(domain))?;
    }

    Ok(())
}

/// Validates the list of domain roots
fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "at least one domain must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for domain in domains {
        let url = Url::parse(domain)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid domain URL '{}': {}", domain, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Domain URL '{}' must use HTTP or HTTPS",
                domain
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain URL '{}' has no host",
                domain
            )));
        }

        if !seen.insert(domain.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Domain '{}' is listed more than once",
                domain
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a resolved domain policy
pub fn validate_domain_config(label: &str, config: &DomainConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "{}: concurrency-limit must be >= 1, got {}",
            label, config.concurrency_limit
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "{}: max-depth must be >= 1, got {}",
            label, config.max_depth
        )));
    }

    if config.navigation_timeout_ms == 0 || config.page_timeout_ms == 0 {
        return Err(ConfigError::Validation(format!(
            "{}: timeouts must be greater than zero",
            label
        )));
    }

    if Selector::parse(&config.ready_selector).is_err() {
        return Err(ConfigError::Validation(format!(
            "{}: ready-selector '{}' is not a valid CSS selector",
            label, config.ready_selector
        )));
    }

    Ok(())
}

/// Validates an override hostname
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidUrl(
            "Override host cannot be empty".to_string(),
        ));
    }

    // Check for invalid characters
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidUrl(format!(
            "Override host '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::InvalidUrl(format!(
            "Override host '{}' is malformed",
            domain
        )));
    }

    Ok(())
}
