//! Crawler coordinator - crawl run lifecycle
//!
//! This module ties one crawl run together:
//! - Creating the output directory
//! - Opening and always closing the browser pool
//! - Resolving domain policies and running the scheduler
//! - Persisting the results once the frontier is exhausted

use crate::config::{Config, PolicyTable};
use crate::crawler::browser::{BrowserLauncher, BrowserPool};
use crate::crawler::fetcher::HttpLauncher;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::strategy::FetchStrategy;
use crate::output::{create_output_directory, persist, CrawlStatistics, PersistedFiles, ResultAggregator};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;

/// Everything a finished crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub results: ResultAggregator,
    pub statistics: CrawlStatistics,
    pub files: PersistedFiles,
}

/// Runs a complete crawl with the given launcher
///
/// The browser pool is closed before returning, whether the run succeeded
/// or failed.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `launcher` - Creates the headless and headful execution contexts
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed and results were written
/// * `Err(CrawlError)` - Start-up or persistence failed
pub async fn run_crawl(
    config: &Config,
    launcher: Arc<dyn BrowserLauncher>,
) -> Result<CrawlReport, CrawlError> {
    let output_dir = Path::new(&config.output.directory);
    create_output_directory(output_dir).await?;

    let browsers = Arc::new(BrowserPool::open(launcher).await?);

    let outcome = crawl_with(config, Arc::clone(&browsers), output_dir).await;
    browsers.close().await;

    if let Err(e) = &outcome {
        tracing::error!("Crawl failed: {}", e);
    }
    outcome
}

async fn crawl_with(
    config: &Config,
    browsers: Arc<BrowserPool>,
    output_dir: &Path,
) -> Result<CrawlReport, CrawlError> {
    let policies = PolicyTable::from_config(config);
    let scheduler = Scheduler::new(&config.crawl.domains, &policies, FetchStrategy::new(browsers))?;

    let mut results = ResultAggregator::with_domains(scheduler.domains());
    let statistics = scheduler.run(&mut results).await;

    let files = persist(&results, output_dir).await?;
    tracing::info!(
        "Crawling complete! Found {} products across {} domains",
        results.total(),
        results.results().len()
    );

    Ok(CrawlReport {
        results,
        statistics,
        files,
    })
}

/// Runs a complete crawl against live sites
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the output directory
/// 2. Launch the headless context
/// 3. Schedule and fetch pages, escalating to headful as policies allow
/// 4. Write the per-domain and summary artifacts
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    run_crawl(config, Arc::new(HttpLauncher::new())).await
}
