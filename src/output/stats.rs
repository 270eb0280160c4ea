//! Crawl run statistics
//!
//! This module provides the counters gathered while a crawl runs and
//! their end-of-run display.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    /// Number of scheduler rounds
    pub rounds: u64,

    /// Tasks that were fetched and classified
    pub pages_fetched: u64,

    /// Child tasks queued from crawlable links
    pub links_enqueued: u64,

    /// Tasks dropped for exceeding the depth bound
    pub dropped_depth: u64,

    /// Tasks dropped because their URL was already visited
    pub dropped_visited: u64,

    /// Tasks whose fetch failed in every permitted mode
    pub failed_tasks: u64,

    /// Individual headless fetch attempts
    pub headless_fetches: u64,

    /// Individual headful fetch attempts
    pub headful_fetches: u64,

    /// Distinct product URLs per domain, in domain order
    pub products_per_domain: Vec<(String, usize)>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn total_products(&self) -> usize {
        self.products_per_domain.iter().map(|(_, n)| n).sum()
    }

    pub fn tasks_dropped(&self) -> u64 {
        self.dropped_depth + self.dropped_visited
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Rounds: {}", stats.rounds);
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!(
        "  Tasks dropped: {} ({} over depth, {} already visited)",
        stats.tasks_dropped(),
        stats.dropped_depth,
        stats.dropped_visited
    );
    println!("  Failed tasks: {}", stats.failed_tasks);
    println!(
        "  Fetch attempts: {} headless, {} headful",
        stats.headless_fetches, stats.headful_fetches
    );
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    println!("Products by Domain:");
    for (domain, count) in &stats.products_per_domain {
        println!("  {}: {}", domain, count);
    }
    println!();

    let success_rate = if stats.pages_fetched + stats.failed_tasks > 0 {
        (stats.pages_fetched as f64 / (stats.pages_fetched + stats.failed_tasks) as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Total: {} products ({:.1}% of attempted pages fetched)",
        stats.total_products(),
        success_rate
    );
}
