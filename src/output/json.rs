//! JSON artifact writer
//!
//! One file per domain plus a cross-domain summary, written once after the
//! crawl has finished.

use crate::output::aggregator::{DomainResult, ResultAggregator};
use crate::url::{domain_file_stem, NormalizedUrl};
use crate::CrawlError;
use chrono::{SecondsFormat, Utc};
use serde::ser::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// File name of the cross-domain summary
pub const SUMMARY_FILE: &str = "all_products.json";

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DomainArtifact<'a> {
    domain: &'a str,
    product_count: usize,
    crawl_date: String,
    products: &'a [NormalizedUrl],
}

/// Domain → products, in domain order
struct Summary<'a>(&'a [DomainResult]);

impl Serialize for Summary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.0
                .iter()
                .map(|result| (result.domain.as_str(), &result.products)),
        )
    }
}

/// Paths written by [`persist`]
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedFiles {
    /// Per-domain files, in domain order
    pub domain_files: Vec<(String, PathBuf)>,
    pub summary_file: PathBuf,
}

/// Creates the output directory and any missing parents
pub async fn create_output_directory(dir: &Path) -> Result<(), CrawlError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| CrawlError::Persist {
            path: dir.to_path_buf(),
            source,
        })
}

/// Path of the artifact for `domain` inside `dir`
pub fn domain_file_path(dir: &Path, domain: &str) -> PathBuf {
    dir.join(format!("{}_products.json", domain_file_stem(domain)))
}

async fn write_json(path: &Path, contents: String) -> Result<(), CrawlError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| CrawlError::Persist {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes every domain artifact and the summary
///
/// All artifacts of one call share a single crawl date.
pub async fn persist(results: &ResultAggregator, dir: &Path) -> Result<PersistedFiles, CrawlError> {
    create_output_directory(dir).await?;

    let crawl_date = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut domain_files = Vec::with_capacity(results.results().len());

    for result in results.results() {
        let artifact = DomainArtifact {
            domain: result.domain.as_str(),
            product_count: result.products.len(),
            crawl_date: crawl_date.clone(),
            products: &result.products,
        };

        let path = domain_file_path(dir, result.domain.as_str());
        write_json(&path, serde_json::to_string_pretty(&artifact)?).await?;
        tracing::info!(
            "Saved {} product URLs to {}",
            result.products.len(),
            path.display()
        );

        domain_files.push((result.domain.to_string(), path));
    }

    let summary_file = dir.join(SUMMARY_FILE);
    write_json(
        &summary_file,
        serde_json::to_string_pretty(&Summary(results.results()))?,
    )
    .await?;
    tracing::info!("Summary saved to {}", summary_file.display());

    Ok(PersistedFiles {
        domain_files,
        summary_file,
    })
}
