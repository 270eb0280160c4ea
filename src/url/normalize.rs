use serde::Serialize;
use std::fmt;
use url::{Position, Url};

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["utm_source", "utm_medium", "utm_campaign", "ref"];

/// Canonical string identity of a page
///
/// Two URLs refer to the same page iff their normalized forms are equal.
/// The form is scheme + host + path + filtered query, without a fragment and
/// without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Normalizes `raw`, which should be an absolute URL
    pub fn new(raw: &str) -> Self {
        Self(normalize_url(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes an absolute URL
///
/// # Normalization Steps
///
/// 1. Parse the URL; if it does not parse, return the input unchanged
/// 2. Drop the fragment
/// 3. Remove tracking query parameters, dropping the query if nothing remains
/// 4. Reassemble, removing trailing slashes from the path
///
/// The result is idempotent: normalizing a normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use product_scout::url::normalize_url;
///
/// let url = normalize_url("https://shop.example/women/?utm_source=mail#top");
/// assert_eq!(url, "https://shop.example/women");
/// assert_eq!(normalize_url(&url), url);
/// ```
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(url) => normalize_parsed(url),
        Err(_) => raw.to_string(),
    }
}

/// Resolves `raw` against `base` and normalizes the absolute result
///
/// Returns `None` when the link cannot be resolved.
pub fn resolve_and_normalize(raw: &str, base: &Url) -> Option<NormalizedUrl> {
    base.join(raw.trim())
        .ok()
        .map(|absolute| NormalizedUrl(normalize_parsed(absolute)))
}

fn normalize_parsed(mut url: Url) -> String {
    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    // Opaque URLs (mailto:, javascript:) have no hierarchical path to trim
    if url.cannot_be_a_base() {
        return url.to_string();
    }

    let head = url[..Position::AfterPath].trim_end_matches('/');
    match url.query() {
        Some(query) => format!("{}?{}", head, query),
        None => head.to_string(),
    }
}
