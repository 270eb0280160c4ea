//! Product-Scout main entry point
//!
//! This is the command-line interface for the Product-Scout product page discoverer.

use anyhow::Context;
use clap::Parser;
use product_scout::config::{load_config_with_hash, validate, Config, PolicyTable};
use product_scout::crawler::crawl;
use product_scout::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Product-Scout: a policy-driven product page discoverer
///
/// Product-Scout crawls a fixed set of e-commerce origins under per-domain
/// policies, escalating to a headful fetch where a domain allows it, and
/// writes the distinct product URLs of every domain as JSON.
#[derive(Parser, Debug)]
#[command(name = "product-scout")]
#[command(version = "1.0.0")]
#[command(about = "A policy-driven product page discoverer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in configuration if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write results to this directory instead of the configured one
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Validate config and show the resolved domain policies without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in configuration");
            Config::default()
        }
    };

    if let Some(dir) = cli.output {
        config.output.directory = dir;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_scout=info,warn"),
            1 => EnvFilter::new("product_scout=debug,info"),
            2 => EnvFilter::new("product_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows every domain's resolved policy
fn handle_dry_run(config: &Config) {
    println!("=== Product-Scout Dry Run ===\n");

    println!("Output directory: {}", config.output.directory);

    let policies = PolicyTable::from_config(config);
    println!("\nDomains ({}):", config.crawl.domains.len());
    for domain in &config.crawl.domains {
        let policy = policies.resolve(domain);
        println!("  - {}", domain);
        println!("    Concurrency limit: {}", policy.concurrency_limit);
        println!("    Max depth: {}", policy.max_depth);
        println!(
            "    Timeouts: navigation {}ms, page {}ms",
            policy.navigation_timeout_ms, policy.page_timeout_ms
        );
        println!("    Headful fallback: {}", policy.headful_fallback);
        println!("    Min product links: {}", policy.min_links_threshold);
        println!(
            "    Product patterns: {}",
            policy
                .product_patterns
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if !policy.exclude_url_patterns.is_empty() {
            println!(
                "    Excluded: {}",
                policy
                    .exclude_url_patterns
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawl.domains.len()
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} domains into {}",
        config.crawl.domains.len(),
        config.output.directory
    );

    let report = crawl(config).await.context("Crawl failed")?;
    tracing::info!("Crawl completed successfully");

    print_statistics(&report.statistics);
    println!("\nResults saved to {}", report.files.summary_file.display());

    Ok(())
}
