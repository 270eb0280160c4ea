//! Headless-then-headful fetch orchestration
//!
//! Every page is first fetched headless. When the domain allows it, a failed
//! headless fetch is retried headful, and a successful but sparse headless
//! fetch is augmented by a headful one whose links are unioned in.

use crate::config::DomainConfig;
use crate::crawler::browser::{BrowserPool, FetchMode, FetchRequest};
use crate::crawler::parser::{extract_page_links, PageLinks};
use crate::state::VisitedSet;
use crate::{FetchError, FetchResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use url::Url;

/// Result of one fetch attempt in one mode
#[derive(Debug)]
pub struct FetchOutcome {
    pub mode: FetchMode,
    pub result: FetchResult<String>,
}

/// Fetch counters of a strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchCounters {
    pub headless_fetches: u64,
    pub headful_fetches: u64,
    pub failed_fetches: u64,
}

/// Orchestrates headless and headful fetches over a shared browser pool
pub struct FetchStrategy {
    browsers: Arc<BrowserPool>,
    headless_fetches: AtomicU64,
    headful_fetches: AtomicU64,
    failed_fetches: AtomicU64,
}

impl FetchStrategy {
    pub fn new(browsers: Arc<BrowserPool>) -> Self {
        Self {
            browsers,
            headless_fetches: AtomicU64::new(0),
            headful_fetches: AtomicU64::new(0),
            failed_fetches: AtomicU64::new(0),
        }
    }

    /// Fetches `url` once in `mode`
    ///
    /// A fresh page is opened for the fetch and closed before returning,
    /// whether rendering succeeded or not.
    pub async fn fetch(&self, url: &str, config: &DomainConfig, mode: FetchMode) -> FetchOutcome {
        let counter = match mode {
            FetchMode::Headless => &self.headless_fetches,
            FetchMode::Headful => &self.headful_fetches,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let result = self.fetch_in_page(url, config, mode).await;
        if let Err(e) = &result {
            self.failed_fetches.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("Error fetching {} in {} mode: {}", url, mode, e);
        }

        FetchOutcome { mode, result }
    }

    async fn fetch_in_page(
        &self,
        url: &str,
        config: &DomainConfig,
        mode: FetchMode,
    ) -> FetchResult<String> {
        let browser = self.browsers.context(mode).await?;
        let mut page = browser.new_page().await?;

        let request = FetchRequest::for_mode(config, mode);
        let rendered = page.render(url, &request).await;
        page.close().await;
        rendered
    }

    /// Fetches a page and classifies its links, escalating to headful as
    /// the domain policy allows
    ///
    /// # Escalation Rules
    ///
    /// | Headless result | `headful_fallback` | Action |
    /// |-----------------|--------------------|--------|
    /// | error | true | headful fetch; its error propagates |
    /// | error | false | error propagates |
    /// | fewer products than `min_links_threshold` | true | headful fetch, links unioned |
    /// | otherwise | any | headless links returned |
    ///
    /// A failed augmenting headful fetch keeps the headless links.
    pub async fn discover(
        &self,
        url: &str,
        domain_root: &Url,
        config: &DomainConfig,
        visited: &VisitedSet,
    ) -> FetchResult<PageLinks> {
        let page_url = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        let classify = |html: &str| extract_page_links(html, &page_url, domain_root, config, visited);

        let headless = self.fetch(url, config, FetchMode::Headless).await;
        match headless.result {
            Ok(html) => {
                let mut links = classify(&html);

                if config.headful_fallback && links.products.len() < config.min_links_threshold {
                    tracing::info!(
                        "Only {} product links found in headless mode for {}, trying headful mode",
                        links.products.len(),
                        url
                    );

                    let headful = self.fetch(url, config, FetchMode::Headful).await;
                    match headful.result {
                        Ok(html) => links.merge(classify(&html)),
                        Err(e) => tracing::warn!(
                            "Headful augmentation failed for {}, keeping headless links: {}",
                            url,
                            e
                        ),
                    }
                }

                Ok(links)
            }
            Err(headless_error) if config.headful_fallback => {
                tracing::info!(
                    "Headless browser failed for {}, trying headful mode as fallback",
                    url
                );

                match self.fetch(url, config, FetchMode::Headful).await.result {
                    Ok(html) => Ok(classify(&html)),
                    Err(e) => {
                        tracing::error!(
                            "Both headless and headful mode failed for {} ({}; {})",
                            url,
                            headless_error,
                            e
                        );
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    pub fn counters(&self) -> FetchCounters {
        FetchCounters {
            headless_fetches: self.headless_fetches.load(Ordering::Relaxed),
            headful_fetches: self.headful_fetches.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::mock_browser::MockLauncher;
    use crate::url::NormalizedUrl;

    const ROOT: &str = "https://shop.example/";

    fn root() -> Url {
        Url::parse(ROOT).unwrap()
    }

    fn fallback_config() -> DomainConfig {
        DomainConfig {
            headful_fallback: true,
            min_links_threshold: 1,
            ..DomainConfig::default()
        }
    }

    async fn strategy(launcher: &MockLauncher) -> FetchStrategy {
        let pool = BrowserPool::open(Arc::new(launcher.clone())).await.unwrap();
        FetchStrategy::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn test_headless_success_no_escalation() {
        let launcher = MockLauncher::new();
        launcher.page(ROOT, r#"<a href="/p/1">1</a><a href="/women">W</a>"#);
        let strategy = strategy(&launcher).await;

        let links = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await
            .unwrap();

        assert_eq!(links.products, vec![NormalizedUrl::new("https://shop.example/p/1")]);
        assert_eq!(links.crawlable, vec![NormalizedUrl::new("https://shop.example/women")]);
        assert_eq!(launcher.fetches(ROOT, FetchMode::Headful), 0);
        assert_eq!(launcher.launches(FetchMode::Headful), 0);
        assert_eq!(launcher.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_sparse_headless_is_augmented_once() {
        let launcher = MockLauncher::new();
        launcher
            .respond(
                ROOT,
                FetchMode::Headless,
                crate::crawler::mock_browser::MockResponse::Html(r#"<a href="/women">W</a>"#.into()),
            )
            .respond(
                ROOT,
                FetchMode::Headful,
                crate::crawler::mock_browser::MockResponse::Html(
                    r#"<a href="/p/9">9</a><a href="/men">M</a>"#.into(),
                ),
            );
        let strategy = strategy(&launcher).await;

        let links = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await
            .unwrap();

        assert_eq!(launcher.fetches(ROOT, FetchMode::Headful), 1);
        assert_eq!(links.products, vec![NormalizedUrl::new("https://shop.example/p/9")]);
        assert_eq!(
            links.crawlable,
            vec![
                NormalizedUrl::new("https://shop.example/women"),
                NormalizedUrl::new("https://shop.example/men")
            ]
        );
        assert_eq!(strategy.counters().headful_fetches, 1);
    }

    #[tokio::test]
    async fn test_sparse_headless_without_fallback() {
        let launcher = MockLauncher::new();
        launcher.page(ROOT, r#"<a href="/women">W</a>"#);
        let strategy = strategy(&launcher).await;

        let links = strategy
            .discover(ROOT, &root(), &DomainConfig::default(), &VisitedSet::new())
            .await
            .unwrap();

        assert!(links.products.is_empty());
        assert_eq!(launcher.total_fetches(FetchMode::Headful), 0);
    }

    #[tokio::test]
    async fn test_failed_augmentation_keeps_headless_links() {
        let launcher = MockLauncher::new();
        launcher
            .page(ROOT, r#"<a href="/women">W</a>"#)
            .fail(ROOT, FetchMode::Headful);
        let strategy = strategy(&launcher).await;

        let links = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await
            .unwrap();

        assert_eq!(links.crawlable, vec![NormalizedUrl::new("https://shop.example/women")]);
        assert_eq!(launcher.open_pages(), 0);
    }

    #[tokio::test]
    async fn test_headless_error_falls_back_to_headful() {
        let launcher = MockLauncher::new();
        launcher
            .page(ROOT, r#"<a href="/p/3">3</a>"#)
            .fail(ROOT, FetchMode::Headless);
        let strategy = strategy(&launcher).await;

        let links = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await
            .unwrap();

        assert_eq!(links.products, vec![NormalizedUrl::new("https://shop.example/p/3")]);
        assert_eq!(launcher.fetches(ROOT, FetchMode::Headful), 1);
    }

    #[tokio::test]
    async fn test_both_modes_fail() {
        let launcher = MockLauncher::new();
        launcher
            .fail(ROOT, FetchMode::Headless)
            .fail(ROOT, FetchMode::Headful);
        let strategy = strategy(&launcher).await;

        let result = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await;

        assert!(matches!(result, Err(FetchError::Navigation { .. })));
        assert_eq!(launcher.open_pages(), 0);
        assert_eq!(strategy.counters().failed_fetches, 2);
    }

    #[tokio::test]
    async fn test_headless_error_without_fallback() {
        let launcher = MockLauncher::new();
        launcher.fail(ROOT, FetchMode::Headless);
        let strategy = strategy(&launcher).await;

        let result = strategy
            .discover(ROOT, &root(), &DomainConfig::default(), &VisitedSet::new())
            .await;

        assert!(result.is_err());
        assert_eq!(launcher.launches(FetchMode::Headful), 0);
    }

    #[tokio::test]
    async fn test_headful_launch_failure_propagates() {
        let launcher = MockLauncher::new();
        launcher
            .fail(ROOT, FetchMode::Headless)
            .fail_launch(FetchMode::Headful);
        let strategy = strategy(&launcher).await;

        let result = strategy
            .discover(ROOT, &root(), &fallback_config(), &VisitedSet::new())
            .await;
        assert!(matches!(result, Err(FetchError::Launch(_))));
    }
}
