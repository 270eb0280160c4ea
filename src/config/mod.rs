//! Configuration module for Product-Scout
//!
//! This module holds the per-domain crawl policy types, the hostname-keyed
//! policy resolver, and TOML loading and validation.
//!
//! # Example
//!
//! ```no_run
//! use product_scout::config::{load_config, PolicyTable};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! let table = PolicyTable::from_config(&config);
//! for domain in &config.crawl.domains {
//!     println!("{} max depth: {}", domain, table.resolve(domain).max_depth);
//! }
//! ```

mod parser;
mod policy;
mod types;
mod validation;

// Re-export types
pub use policy::PolicyTable;
pub use types::{
    Config, CrawlSettings, DomainConfig, DomainOverride, OutputConfig, ResourceType, WaitUntil,
    DEFAULT_DOMAINS, DEFAULT_PRODUCT_PATTERNS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::{validate, validate_domain_config};
