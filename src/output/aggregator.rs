//! Per-domain product result collection

use crate::state::DomainKey;
use crate::url::NormalizedUrl;

/// Ordered, duplicate-free product URLs of one domain
#[derive(Debug, Clone, PartialEq)]
pub struct DomainResult {
    pub domain: DomainKey,
    pub products: Vec<NormalizedUrl>,
}

/// Collects product URLs per domain
///
/// Domains are kept in the order they were registered, and each domain's
/// products in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    results: Vec<DomainResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an aggregator with an empty result for every domain
    pub fn with_domains<'a>(domains: impl IntoIterator<Item = &'a DomainKey>) -> Self {
        let mut aggregator = Self::new();
        for domain in domains {
            aggregator.entry(domain);
        }
        aggregator
    }

    fn entry(&mut self, domain: &DomainKey) -> &mut DomainResult {
        let index = match self.results.iter().position(|r| &r.domain == domain) {
            Some(index) => index,
            None => {
                self.results.push(DomainResult {
                    domain: domain.clone(),
                    products: Vec::new(),
                });
                self.results.len() - 1
            }
        };
        &mut self.results[index]
    }

    /// Appends every URL not already recorded for `domain`
    ///
    /// Returns the number of URLs that were new.
    pub fn accept(&mut self, domain: &DomainKey, urls: &[NormalizedUrl]) -> usize {
        let result = self.entry(domain);
        let mut added = 0;
        for url in urls {
            if !result.products.contains(url) {
                result.products.push(url.clone());
                added += 1;
            }
        }
        added
    }

    pub fn products(&self, domain: &DomainKey) -> &[NormalizedUrl] {
        self.results
            .iter()
            .find(|r| &r.domain == domain)
            .map(|r| r.products.as_slice())
            .unwrap_or(&[])
    }

    pub fn results(&self) -> &[DomainResult] {
        &self.results
    }

    /// Total products across all domains
    pub fn total(&self) -> usize {
        self.results.iter().map(|r| r.products.len()).sum()
    }
}
