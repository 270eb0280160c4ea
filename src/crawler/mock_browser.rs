//! Scripted execution contexts for tests
//!
//! `MockLauncher` serves HTML from an in-memory site keyed by normalized URL,
//! per fetch mode, and counts launches, closes, page lifetimes and fetches.

use crate::crawler::browser::{Browser, BrowserLauncher, FetchMode, FetchRequest, Page};
use crate::url::normalize_url;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a scripted page returns
#[derive(Debug, Clone)]
pub enum MockResponse {
    Html(String),
    Fail(String),
}

#[derive(Debug, Default)]
struct MockSite {
    pages: Mutex<HashMap<(String, FetchMode), MockResponse>>,
    fetches: Mutex<HashMap<(String, FetchMode), usize>>,
    launches: Mutex<HashMap<FetchMode, usize>>,
    closes: Mutex<HashMap<FetchMode, usize>>,
    failing_launches: Mutex<Vec<FetchMode>>,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// A launcher whose contexts render scripted pages
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    site: Arc<MockSite>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` for `url` in both modes
    pub fn page(&self, url: &str, html: impl Into<String>) -> &Self {
        let html = html.into();
        self.respond(url, FetchMode::Headless, MockResponse::Html(html.clone()));
        self.respond(url, FetchMode::Headful, MockResponse::Html(html))
    }

    /// Scripts the response for `url` in one mode
    pub fn respond(&self, url: &str, mode: FetchMode, response: MockResponse) -> &Self {
        self.site
            .pages
            .lock()
            .insert((normalize_url(url), mode), response);
        self
    }

    /// Makes fetches of `url` in `mode` fail
    pub fn fail(&self, url: &str, mode: FetchMode) -> &Self {
        self.respond(url, mode, MockResponse::Fail(format!("{} fetch refused", mode)))
    }

    /// Makes launching a context of `mode` fail
    pub fn fail_launch(&self, mode: FetchMode) -> &Self {
        self.site.failing_launches.lock().push(mode);
        self
    }

    /// Delays every render, so concurrent fetches overlap
    pub fn with_delay(&self, delay: Duration) -> &Self {
        *self.site.delay.lock() = Some(delay);
        self
    }

    /// Number of renders of `url` in `mode`
    pub fn fetches(&self, url: &str, mode: FetchMode) -> usize {
        self.site
            .fetches
            .lock()
            .get(&(normalize_url(url), mode))
            .copied()
            .unwrap_or(0)
    }

    /// Number of renders in `mode` across all URLs
    pub fn total_fetches(&self, mode: FetchMode) -> usize {
        self.site
            .fetches
            .lock()
            .iter()
            .filter(|((_, m), _)| *m == mode)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn launches(&self, mode: FetchMode) -> usize {
        self.site.launches.lock().get(&mode).copied().unwrap_or(0)
    }

    pub fn closes(&self, mode: FetchMode) -> usize {
        self.site.closes.lock().get(&mode).copied().unwrap_or(0)
    }

    /// Pages opened but not yet closed
    pub fn open_pages(&self) -> usize {
        self.site.pages_opened.load(Ordering::SeqCst) - self.site.pages_closed.load(Ordering::SeqCst)
    }

    /// Highest number of renders observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.site.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for MockLauncher {
    async fn launch(&self, mode: FetchMode) -> FetchResult<Arc<dyn Browser>> {
        if self.site.failing_launches.lock().contains(&mode) {
            return Err(FetchError::Launch(format!("{} launch refused", mode)));
        }
        *self.site.launches.lock().entry(mode).or_insert(0) += 1;

        Ok(Arc::new(MockBrowser {
            mode,
            site: Arc::clone(&self.site),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MockBrowser {
    mode: FetchMode,
    site: Arc<MockSite>,
    closed: AtomicBool,
}

#[async_trait]
impl Browser for MockBrowser {
    async fn new_page(&self) -> FetchResult<Box<dyn Page>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::ContextClosed);
        }
        self.site.pages_opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockPage {
            mode: self.mode,
            site: Arc::clone(&self.site),
        }))
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            *self.site.closes.lock().entry(self.mode).or_insert(0) += 1;
        }
    }
}

struct MockPage {
    mode: FetchMode,
    site: Arc<MockSite>,
}

#[async_trait]
impl Page for MockPage {
    async fn render(&mut self, url: &str, _request: &FetchRequest) -> FetchResult<String> {
        let key = (normalize_url(url), self.mode);
        *self.site.fetches.lock().entry(key.clone()).or_insert(0) += 1;

        let now = self.site.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.site.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.site.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.site.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.site.pages.lock().get(&key).cloned();
        match response {
            Some(MockResponse::Html(html)) => Ok(html),
            Some(MockResponse::Fail(message)) => Err(FetchError::Navigation {
                url: url.to_string(),
                message,
            }),
            None => Err(FetchError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            }),
        }
    }

    async fn close(self: Box<Self>) {
        self.site.pages_closed.fetch_add(1, Ordering::SeqCst);
    }
}
