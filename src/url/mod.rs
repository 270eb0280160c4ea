//! URL handling module for Product-Scout
//!
//! This module provides URL normalization, pattern matching, origin checks
//! and link classification.

mod domain;
mod matcher;
mod normalize;

use crate::config::DomainConfig;
use crate::state::VisitedSet;
use url::Url;

// Re-export main functions
pub use domain::{domain_file_stem, extract_host, same_origin};
pub use matcher::{first_match, UrlPattern};
pub use normalize::{normalize_url, resolve_and_normalize, NormalizedUrl};

/// Path suffixes that never lead to crawlable pages
const IGNORED_EXTENSIONS: &[&str] = &[".jpg", ".png", ".pdf"];

/// Classification of a link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// The link points at a product detail page
    Product(NormalizedUrl),
    /// The link should be enqueued for crawling
    Crawlable(NormalizedUrl),
    /// The link is dropped
    Ignored(IgnoreReason),
}

/// Why a link was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    /// The href could not be resolved against the page URL
    Unresolvable,
    /// Empty, fragment-only or a script pseudo-URL
    NotNavigable,
    /// Image or PDF resource
    Asset,
    /// Different scheme, host or port than the domain root
    CrossOrigin,
    /// Already in the visited set
    AlreadyVisited,
    /// Matches one of the domain's exclude patterns
    Excluded,
}

impl LinkClass {
    pub fn is_product(&self) -> bool {
        matches!(self, Self::Product(_))
    }

    pub fn is_crawlable(&self) -> bool {
        matches!(self, Self::Crawlable(_))
    }
}

/// Classifies a raw `href` found on `page_url`
///
/// # Classification Order
///
/// 1. Resolve against the page URL; failure → Ignored
/// 2. Normalize
/// 3. Any product pattern matches → Product
/// 4. Crawlable when the link is navigable, not an image/PDF, same-origin
///    with the domain root, not yet visited, and matches no exclude pattern
/// 5. Otherwise Ignored
///
/// # Examples
///
/// ```
/// use product_scout::config::DomainConfig;
/// use product_scout::state::VisitedSet;
/// use product_scout::url::{classify_link, LinkClass};
/// use url::Url;
///
/// let config = DomainConfig::default();
/// let visited = VisitedSet::new();
/// let root = Url::parse("https://shop.example/").unwrap();
///
/// let class = classify_link("/p/123", &root, &root, &config, &visited);
/// assert!(matches!(class, LinkClass::Product(ref u) if u.as_str() == "https://shop.example/p/123"));
///
/// let class = classify_link("/women", &root, &root, &config, &visited);
/// assert!(class.is_crawlable());
/// ```
pub fn classify_link(
    raw: &str,
    page_url: &Url,
    domain_root: &Url,
    config: &DomainConfig,
    visited: &VisitedSet,
) -> LinkClass {
    let normalized = match resolve_and_normalize(raw, page_url) {
        Some(n) => n,
        None => return LinkClass::Ignored(IgnoreReason::Unresolvable),
    };

    if first_match(&config.product_patterns, normalized.as_str()).is_some() {
        return LinkClass::Product(normalized);
    }

    let href = raw.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return LinkClass::Ignored(IgnoreReason::NotNavigable);
    }

    // Re-parsing the normalized form cannot fail: it came from a parsed Url
    let parsed = match Url::parse(normalized.as_str()) {
        Ok(u) => u,
        Err(_) => return LinkClass::Ignored(IgnoreReason::Unresolvable),
    };

    if parsed.scheme() == "javascript" {
        return LinkClass::Ignored(IgnoreReason::NotNavigable);
    }

    if IGNORED_EXTENSIONS
        .iter()
        .any(|ext| parsed.path().ends_with(ext))
    {
        return LinkClass::Ignored(IgnoreReason::Asset);
    }

    if !same_origin(&parsed, domain_root) {
        return LinkClass::Ignored(IgnoreReason::CrossOrigin);
    }

    if visited.contains(&normalized) {
        return LinkClass::Ignored(IgnoreReason::AlreadyVisited);
    }

    if first_match(&config.exclude_url_patterns, normalized.as_str()).is_some() {
        return LinkClass::Ignored(IgnoreReason::Excluded);
    }

    LinkClass::Crawlable(normalized)
}
