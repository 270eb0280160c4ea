//! Product-Scout: a policy-driven product page discoverer
//!
//! This crate traverses the link graphs of a fixed set of e-commerce origins,
//! classifying every link it finds as a product page, a page worth crawling,
//! or noise. Each origin is crawled under its own policy (depth bound,
//! concurrency bound, exclusion rules, headful fallback) and the distinct
//! product URLs are written out as JSON once the frontier is exhausted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Product-Scout operations
///
/// Only configuration, persistence and browser start-up failures surface
/// here. Per-page failures are absorbed by the scheduler.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Errors raised by a page fetch in either mode
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Timed out during {phase} of {url}")]
    Timeout { url: String, phase: &'static str },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Request for {url} aborted: resource type '{resource}' is blocked")]
    Blocked { url: String, resource: String },

    #[error("Ready selector '{selector}' never matched on {url}")]
    ReadySelector { url: String, selector: String },

    #[error("Invalid ready selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid page URL: {0}")]
    InvalidUrl(String),

    #[error("Execution context is closed")]
    ContextClosed,

    #[error("Failed to launch execution context: {0}")]
    Launch(String),
}

/// Result type alias for Product-Scout operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{Config, DomainConfig, DomainOverride, PolicyTable};
pub use state::{CrawlTask, DomainKey};
pub use url::{classify_link, normalize_url, LinkClass, NormalizedUrl};
