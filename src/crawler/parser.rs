//! HTML parser for extracting links and product metadata
//!
//! This module handles parsing rendered HTML to extract:
//! - Anchor `href` values in document order
//! - JSON-LD structured-data blocks
//!
//! and turns them into the product and crawlable links of one page.

use crate::config::DomainConfig;
use crate::state::VisitedSet;
use crate::url::{classify_link, LinkClass, NormalizedUrl};
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Raw material extracted from one HTML document
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Every anchor `href`, in document order, untrimmed and unresolved
    pub hrefs: Vec<String>,

    /// Text of every `<script type="application/ld+json">` block
    pub structured_data: Vec<String>,
}

/// Product and crawlable links found on one page
///
/// Both lists hold distinct URLs in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLinks {
    pub products: Vec<NormalizedUrl>,
    pub crawlable: Vec<NormalizedUrl>,
}

impl PageLinks {
    pub fn add_product(&mut self, url: NormalizedUrl) {
        if !self.products.contains(&url) {
            self.products.push(url);
        }
    }

    pub fn add_crawlable(&mut self, url: NormalizedUrl) {
        if !self.crawlable.contains(&url) {
            self.crawlable.push(url);
        }
    }

    /// Unions `other` into `self`, keeping first-seen order
    pub fn merge(&mut self, other: PageLinks) {
        for url in other.products {
            self.add_product(url);
        }
        for url in other.crawlable {
            self.add_crawlable(url);
        }
    }
}

/// Parses HTML content and extracts hrefs and structured data
///
/// # Example
///
/// ```
/// use product_scout::crawler::parse_html;
///
/// let html = r#"<html><body><a href="/p/1">Shoe</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.hrefs, vec!["/p/1".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let hrefs = match Selector::parse("a[href]") {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };

    let structured_data = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(selector) => document
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect(),
        Err(_) => Vec::new(),
    };

    ParsedPage {
        hrefs,
        structured_data,
    }
}

/// Returns true if any structured-data block declares a `Product`
///
/// Accepted shapes: an object whose `@type` is `"Product"` or an array
/// containing it, a top-level array of such objects, and objects listed
/// under `@graph`. Blocks that are not valid JSON are skipped.
pub fn scan_structured_data(page: &ParsedPage) -> bool {
    page.structured_data.iter().any(|block| {
        match serde_json::from_str::<Value>(block.trim()) {
            Ok(value) => declares_product(&value),
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                false
            }
        }
    })
}

fn declares_product(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().any(declares_product),
        Value::Object(map) => {
            let typed = match map.get("@type") {
                Some(Value::String(t)) => t == "Product",
                Some(Value::Array(types)) => types.iter().any(|t| t == "Product"),
                _ => false,
            };
            typed || map.get("@graph").map_or(false, declares_product)
        }
        _ => false,
    }
}

/// Classifies every link of a rendered page
///
/// When the page's own structured data declares a product, the page URL
/// itself is added to the products even if no pattern matches it.
pub fn extract_page_links(
    html: &str,
    page_url: &Url,
    domain_root: &Url,
    config: &DomainConfig,
    visited: &VisitedSet,
) -> PageLinks {
    let parsed = parse_html(html);
    let mut links = PageLinks::default();
    let mut ignored = HashSet::new();

    for href in &parsed.hrefs {
        match classify_link(href, page_url, domain_root, config, visited) {
            LinkClass::Product(url) => links.add_product(url),
            LinkClass::Crawlable(url) => links.add_crawlable(url),
            LinkClass::Ignored(reason) => {
                ignored.insert(reason);
            }
        }
    }

    if scan_structured_data(&parsed) {
        tracing::debug!("{} declares a Product in JSON-LD", page_url);
        links.add_product(NormalizedUrl::new(page_url.as_str()));
    }

    tracing::trace!(
        "{}: {} hrefs, {} products, {} crawlable, ignored kinds {:?}",
        page_url,
        parsed.hrefs.len(),
        links.products.len(),
        links.crawlable.len(),
        ignored
    );

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://shop.example/").unwrap()
    }

    fn page(html: &str) -> ParsedPage {
        parse_html(html)
    }

    #[test]
    fn test_hrefs_in_document_order() {
        let parsed = page(
            r##"<html><body>
                <a href="/b">B</a>
                <a>No href</a>
                <a href="#top">Top</a>
                <a href="https://other.example/a">A</a>
            </body></html>"##,
        );
        assert_eq!(parsed.hrefs, vec!["/b", "#top", "https://other.example/a"]);
    }

    #[test]
    fn test_structured_data_blocks() {
        let parsed = page(
            r#"<html><head>
                <script type="application/ld+json">{"@type":"Product","name":"Kurta"}</script>
                <script type="text/javascript">var x = 1;</script>
            </head></html>"#,
        );
        assert_eq!(parsed.structured_data.len(), 1);
        assert!(scan_structured_data(&parsed));
    }

    #[test]
    fn test_scan_rejects_other_types_and_bad_json() {
        let parsed = page(
            r#"<html><head>
                <script type="application/ld+json">{"@type":"Organization"}</script>
                <script type="application/ld+json">{not json</script>
            </head></html>"#,
        );
        assert!(!scan_structured_data(&parsed));
    }

    #[test]
    fn test_scan_nested_shapes() {
        assert!(declares_product(&serde_json::json!([{"@type": "BreadcrumbList"}, {"@type": "Product"}])));
        assert!(declares_product(&serde_json::json!({"@type": ["Product", "Thing"]})));
        assert!(declares_product(&serde_json::json!({"@graph": [{"@type": "Product"}]})));
        assert!(!declares_product(&serde_json::json!({"name": "Product"})));
    }

    #[test]
    fn test_extract_page_links() {
        let html = r#"<html><body>
            <a href="/p/123">Shoe</a>
            <a href="/p/123?utm_source=grid">Shoe again</a>
            <a href="/women/">Women</a>
            <a href="/women">Women again</a>
            <a href="https://other.example/sale">Elsewhere</a>
            <a href="/lookbook.pdf">Lookbook</a>
        </body></html>"#;

        let visited = VisitedSet::new();
        let links = extract_page_links(html, &root(), &root(), &DomainConfig::default(), &visited);

        assert_eq!(links.products, vec![NormalizedUrl::new("https://shop.example/p/123")]);
        assert_eq!(links.crawlable, vec![NormalizedUrl::new("https://shop.example/women")]);
    }

    #[test]
    fn test_structured_product_adds_page_url() {
        let page_url = Url::parse("https://shop.example/kurta-blue/?ref=home").unwrap();
        let html = r#"<html><head>
            <script type="application/ld+json">{"@context":"https://schema.org","@type":"Product"}</script>
        </head><body></body></html>"#;

        let visited = VisitedSet::new();
        let links = extract_page_links(html, &page_url, &root(), &DomainConfig::default(), &visited);
        assert_eq!(links.products, vec![NormalizedUrl::new("https://shop.example/kurta-blue")]);
    }

    #[test]
    fn test_merge_is_union() {
        let mut a = PageLinks::default();
        a.add_product(NormalizedUrl::new("https://shop.example/p/1"));
        a.add_crawlable(NormalizedUrl::new("https://shop.example/men"));

        let mut b = PageLinks::default();
        b.add_product(NormalizedUrl::new("https://shop.example/p/2"));
        b.add_product(NormalizedUrl::new("https://shop.example/p/1"));

        a.merge(b);
        assert_eq!(
            a.products,
            vec![
                NormalizedUrl::new("https://shop.example/p/1"),
                NormalizedUrl::new("https://shop.example/p/2")
            ]
        );
        assert_eq!(a.crawlable.len(), 1);
    }
}
