//! HTTP-backed page fetcher
//!
//! This module provides the concrete execution context used by the binary:
//! - Building HTTP clients that present browser-like headers
//! - Navigation bounded by the navigation timeout
//! - Page readiness bounded by the page timeout and the ready selector
//! - Request interception for the document request
//!
//! The HTML returned is the server-rendered document; no script runs. Every
//! `wait-until` condition is therefore treated as "document received": the
//! condition is logged but does not change when the page counts as loaded.

use crate::config::ResourceType;
use crate::crawler::browser::{Browser, BrowserLauncher, FetchMode, FetchRequest, Page};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client};
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// User agent presented in both modes
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Builds an HTTP client with browser-like default headers
///
/// # Example
///
/// ```no_run
/// use product_scout::crawler::build_http_client;
///
/// let client = build_http_client().unwrap();
/// ```
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Launches HTTP-backed execution contexts
#[derive(Debug, Default, Clone)]
pub struct HttpLauncher;

impl HttpLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for HttpLauncher {
    async fn launch(&self, mode: FetchMode) -> FetchResult<Arc<dyn Browser>> {
        let client = build_http_client().map_err(|e| FetchError::Launch(e.to_string()))?;
        Ok(Arc::new(HttpBrowser::new(mode, client)))
    }
}

/// An execution context backed by one HTTP client
pub struct HttpBrowser {
    mode: FetchMode,
    client: Client,
    closed: Arc<AtomicBool>,
}

impl HttpBrowser {
    pub fn new(mode: FetchMode, client: Client) -> Self {
        Self {
            mode,
            client,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> FetchResult<Box<dyn Page>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::ContextClosed);
        }

        Ok(Box::new(HttpPage {
            mode: self.mode,
            client: self.client.clone(),
            browser_closed: Arc::clone(&self.closed),
        }))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// One navigation's document context
struct HttpPage {
    mode: FetchMode,
    client: Client,
    browser_closed: Arc<AtomicBool>,
}

#[async_trait]
impl Page for HttpPage {
    /// Loads `url` and returns its HTML once the ready selector matches
    ///
    /// # Request Flow
    ///
    /// 1. Abort if the `document` resource type is blocked
    /// 2. Send GET, bounded by the navigation timeout
    /// 3. Read the body, bounded by the page timeout
    /// 4. Require the ready selector to match the parsed document
    async fn render(&mut self, url: &str, request: &FetchRequest) -> FetchResult<String> {
        if self.browser_closed.load(Ordering::SeqCst) {
            return Err(FetchError::ContextClosed);
        }

        if request.blocks(ResourceType::Document) {
            return Err(FetchError::Blocked {
                url: url.to_string(),
                resource: ResourceType::Document.to_string(),
            });
        }

        tracing::debug!(
            "Loading {} in {} mode (wait until {:?})",
            url,
            self.mode,
            request.wait_until
        );

        let response = tokio::time::timeout(request.navigation_timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                phase: "navigation",
            })?
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // A browser still renders error pages; only log the status
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
        }

        let body = tokio::time::timeout(request.page_timeout, response.text())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                phase: "page load",
            })?
            .map_err(|e| FetchError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let selector = Selector::parse(&request.ready_selector)
            .map_err(|e| FetchError::InvalidSelector(format!("{}: {:?}", request.ready_selector, e)))?;

        if !document_matches(&body, &selector) {
            return Err(FetchError::ReadySelector {
                url: url.to_string(),
                selector: request.ready_selector.clone(),
            });
        }

        Ok(body)
    }

    async fn close(self: Box<Self>) {}
}

fn document_matches(html: &str, selector: &Selector) -> bool {
    Html::parse_document(html).select(selector).next().is_some()
}
