//! Crawler module for page fetching and crawl scheduling
//!
//! This module contains the core crawling logic, including:
//! - Execution contexts and the HTTP-backed page fetcher
//! - HTML parsing, link classification and JSON-LD scanning
//! - Headless-then-headful fetch escalation
//! - Round-based frontier scheduling
//! - Overall crawl coordination

mod browser;
mod coordinator;
mod fetcher;
pub mod mock_browser;
mod parser;
mod scheduler;
mod strategy;

pub use browser::{Browser, BrowserLauncher, BrowserPool, FetchMode, FetchRequest, Page};
pub use coordinator::{crawl, run_crawl, CrawlReport};
pub use fetcher::{build_http_client, HttpBrowser, HttpLauncher, BROWSER_USER_AGENT};
pub use parser::{extract_page_links, parse_html, scan_structured_data, PageLinks, ParsedPage};
pub use scheduler::{DropReason, Scheduler, SchedulerState, TaskOutcome};
pub use strategy::{FetchCounters, FetchOutcome, FetchStrategy};
