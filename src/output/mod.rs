//! Output module for crawl results
//!
//! This module handles:
//! - Collecting distinct product URLs per domain
//! - Writing the per-domain and summary JSON artifacts
//! - Recording crawl statistics

mod aggregator;
mod json;
pub mod stats;

pub use aggregator::{DomainResult, ResultAggregator};
pub use json::{create_output_directory, domain_file_path, persist, PersistedFiles, SUMMARY_FILE};
pub use stats::{print_statistics, CrawlStatistics};
