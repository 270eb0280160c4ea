//! Execution contexts for page rendering
//!
//! A `Browser` is a long-lived execution context shared by every fetch of
//! one mode. A `Page` is the per-fetch document context; it is owned by a
//! single fetch and closed when that fetch ends.

use crate::config::{DomainConfig, ResourceType, WaitUntil};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Rendering mode of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Resource-restricted and fast
    Headless,
    /// Full-featured fallback
    Headful,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Headless => f.write_str("headless"),
            Self::Headful => f.write_str("headful"),
        }
    }
}

/// Everything a page needs to load one URL
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub navigation_timeout: Duration,
    pub page_timeout: Duration,
    /// Requests of these types are aborted; empty disables interception
    pub blocked_resource_types: Vec<ResourceType>,
    pub wait_until: WaitUntil,
    pub ready_selector: String,
}

impl FetchRequest {
    /// Builds the request for `mode` from a domain policy
    ///
    /// Resource blocking applies to headless fetches only.
    pub fn for_mode(config: &DomainConfig, mode: FetchMode) -> Self {
        let blocked_resource_types = match mode {
            FetchMode::Headless => config.blocked_resource_types.clone(),
            FetchMode::Headful => Vec::new(),
        };

        Self {
            navigation_timeout: config.navigation_timeout(),
            page_timeout: config.page_timeout(),
            blocked_resource_types,
            wait_until: config.wait_until,
            ready_selector: config.ready_selector.clone(),
        }
    }

    pub fn blocks(&self, resource: ResourceType) -> bool {
        self.blocked_resource_types.contains(&resource)
    }
}

/// A per-fetch document context
#[async_trait]
pub trait Page: Send {
    /// Navigates to `url` and returns the rendered HTML once ready
    async fn render(&mut self, url: &str, request: &FetchRequest) -> FetchResult<String>;

    /// Releases the page
    async fn close(self: Box<Self>);
}

/// A long-lived execution context
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a fresh page
    async fn new_page(&self) -> FetchResult<Box<dyn Page>>;

    /// Shuts the context down; calling it again has no effect
    async fn close(&self);
}

/// Creates execution contexts
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, mode: FetchMode) -> FetchResult<Arc<dyn Browser>>;
}

/// The two shared execution contexts of a crawl run
///
/// The headless context is launched by `open`; the headful one is launched
/// on first use and then reused. `close` tears both down exactly once.
pub struct BrowserPool {
    launcher: Arc<dyn BrowserLauncher>,
    headless: Arc<dyn Browser>,
    headful: OnceCell<Arc<dyn Browser>>,
    closed: AtomicBool,
}

impl BrowserPool {
    /// Launches the headless context
    pub async fn open(launcher: Arc<dyn BrowserLauncher>) -> FetchResult<Self> {
        let headless = launcher.launch(FetchMode::Headless).await?;
        tracing::info!("Headless browser initialized");

        Ok(Self {
            launcher,
            headless,
            headful: OnceCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Returns the context for `mode`, launching the headful one if needed
    pub async fn context(&self, mode: FetchMode) -> FetchResult<Arc<dyn Browser>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::ContextClosed);
        }

        match mode {
            FetchMode::Headless => Ok(Arc::clone(&self.headless)),
            FetchMode::Headful => {
                let browser = self
                    .headful
                    .get_or_try_init(|| async {
                        let browser = self.launcher.launch(FetchMode::Headful).await?;
                        tracing::info!("Initialized headful browser for fallback");
                        Ok::<_, FetchError>(browser)
                    })
                    .await?;
                Ok(Arc::clone(browser))
            }
        }
    }

    /// Whether the headful context has been launched
    pub fn headful_launched(&self) -> bool {
        self.headful.initialized()
    }

    /// Closes both contexts; later calls do nothing
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.headless.close().await;
        tracing::info!("Headless browser closed");

        if let Some(headful) = self.headful.get() {
            headful.close().await;
            tracing::info!("Headful browser closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
