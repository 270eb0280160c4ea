use crate::url::UrlPattern;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Domains crawled when no configuration file is given
pub const DEFAULT_DOMAINS: &[&str] = &[
    "https://www.tatacliq.com/",
    "https://www.virgio.com/",
    "https://www.nykaafashion.com/",
    "https://www.westside.com/",
];

/// Product URL patterns used when a domain does not override them
pub const DEFAULT_PRODUCT_PATTERNS: &[&str] = &[
    r"/products/",
    r"/p/",
    r"/items/",
    r"/product/",
    r"/prod/",
    r"/p-[a-zA-Z0-9]+",
];

/// Main configuration structure for Product-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlSettings,

    pub output: OutputConfig,

    /// Partial override applied on top of the built-in domain defaults
    #[serde(default)]
    pub defaults: DomainOverride,

    /// Per-hostname partial overrides
    #[serde(default)]
    pub overrides: HashMap<String, DomainOverride>,
}

/// Which domains to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// Domain root URLs, each seeded at depth 1
    pub domains: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the per-domain and summary JSON files
    pub directory: String,
}

impl Default for Config {
    /// The built-in configuration: four fashion retailers with their overrides
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(
            "www.tatacliq.com".to_string(),
            DomainOverride {
                concurrency_limit: Some(50),
                headful_fallback: Some(true),
                ..DomainOverride::default()
            },
        );
        overrides.insert(
            "www.virgio.com".to_string(),
            DomainOverride {
                max_depth: Some(10),
                ..DomainOverride::default()
            },
        );
        overrides.insert(
            "www.nykaafashion.com".to_string(),
            DomainOverride {
                max_depth: Some(5),
                ..DomainOverride::default()
            },
        );
        overrides.insert(
            "www.westside.com".to_string(),
            DomainOverride {
                max_depth: Some(10),
                exclude_url_patterns: Some(built_in_patterns(&["/apps/buy/"])),
                concurrency_limit: Some(100),
                headful_fallback: Some(true),
                ..DomainOverride::default()
            },
        );

        Self {
            crawl: CrawlSettings {
                domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
            },
            output: OutputConfig {
                directory: "./results".to_string(),
            },
            defaults: DomainOverride::default(),
            overrides,
        }
    }
}

/// Resource types a page may request while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    Xhr,
    Fetch,
    Other,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Stylesheet => "stylesheet",
            Self::Image => "image",
            Self::Media => "media",
            Self::Font => "font",
            Self::Script => "script",
            Self::Xhr => "xhr",
            Self::Fetch => "fetch",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Navigation lifecycle event that completes a page load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle0,
    NetworkIdle2,
}

/// Resolved crawl policy for one domain
#[derive(Debug, Clone, PartialEq)]
pub struct DomainConfig {
    /// Maximum tasks processed in parallel per round
    pub concurrency_limit: usize,

    /// Deepest task depth that is still fetched (seed is depth 1)
    pub max_depth: u32,

    /// Budget for the page to become ready after navigation
    pub page_timeout_ms: u64,

    /// Budget for the navigation itself
    pub navigation_timeout_ms: u64,

    /// Resource types aborted during headless fetches
    pub blocked_resource_types: Vec<ResourceType>,

    /// Lifecycle event awaited by navigation
    pub wait_until: WaitUntil,

    /// CSS selector that must be present before the HTML is read
    pub ready_selector: String,

    /// URLs matching any of these are product pages
    pub product_patterns: Vec<UrlPattern>,

    /// Escalate to a headful fetch on failure or sparse results
    pub headful_fallback: bool,

    /// Product links a headless fetch must yield to avoid escalation
    pub min_links_threshold: usize,

    /// URLs matching any of these are never crawled
    pub exclude_url_patterns: Vec<UrlPattern>,
}

impl DomainConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_millis(self.page_timeout_ms)
    }

    /// Applies a partial override
    ///
    /// Every field present in `patch` replaces the field wholesale. Lists are
    /// replaced, never merged element-wise.
    pub fn merged(&self, patch: &DomainOverride) -> DomainConfig {
        DomainConfig {
            concurrency_limit: patch.concurrency_limit.unwrap_or(self.concurrency_limit),
            max_depth: patch.max_depth.unwrap_or(self.max_depth),
            page_timeout_ms: patch.page_timeout_ms.unwrap_or(self.page_timeout_ms),
            navigation_timeout_ms: patch
                .navigation_timeout_ms
                .unwrap_or(self.navigation_timeout_ms),
            blocked_resource_types: patch
                .blocked_resource_types
                .clone()
                .unwrap_or_else(|| self.blocked_resource_types.clone()),
            wait_until: patch.wait_until.unwrap_or(self.wait_until),
            ready_selector: patch
                .ready_selector
                .clone()
                .unwrap_or_else(|| self.ready_selector.clone()),
            product_patterns: patch
                .product_patterns
                .clone()
                .unwrap_or_else(|| self.product_patterns.clone()),
            headful_fallback: patch.headful_fallback.unwrap_or(self.headful_fallback),
            min_links_threshold: patch
                .min_links_threshold
                .unwrap_or(self.min_links_threshold),
            exclude_url_patterns: patch
                .exclude_url_patterns
                .clone()
                .unwrap_or_else(|| self.exclude_url_patterns.clone()),
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 100,
            max_depth: 20,
            page_timeout_ms: 10_000,
            navigation_timeout_ms: 100_000,
            blocked_resource_types: vec![
                ResourceType::Image,
                ResourceType::Stylesheet,
                ResourceType::Font,
                ResourceType::Media,
            ],
            wait_until: WaitUntil::DomContentLoaded,
            ready_selector: "html".to_string(),
            product_patterns: built_in_patterns(DEFAULT_PRODUCT_PATTERNS),
            headful_fallback: false,
            min_links_threshold: 1,
            exclude_url_patterns: Vec::new(),
        }
    }
}

/// A partial domain policy; absent fields keep the base value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DomainOverride {
    pub concurrency_limit: Option<usize>,
    pub max_depth: Option<u32>,
    pub page_timeout_ms: Option<u64>,
    pub navigation_timeout_ms: Option<u64>,
    pub blocked_resource_types: Option<Vec<ResourceType>>,
    pub wait_until: Option<WaitUntil>,
    pub ready_selector: Option<String>,
    pub product_patterns: Option<Vec<UrlPattern>>,
    pub headful_fallback: Option<bool>,
    pub min_links_threshold: Option<usize>,
    pub exclude_url_patterns: Option<Vec<UrlPattern>>,
}

/// Compiles patterns that are known to be valid at build time
fn built_in_patterns(sources: &[&str]) -> Vec<UrlPattern> {
    sources
        .iter()
        .filter_map(|source| UrlPattern::new(source).ok())
        .collect()
}
