use crate::config::types::{Config, DomainConfig, DomainOverride};
use crate::url::extract_host;
use std::collections::HashMap;

/// Resolves per-domain crawl policies by hostname
///
/// The table holds the base policy and the per-host overrides. Resolution is
/// `base.merged(override)`, or the base alone when the host has no override.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    base: DomainConfig,
    overrides: HashMap<String, DomainOverride>,
}

impl PolicyTable {
    pub fn new(base: DomainConfig, overrides: HashMap<String, DomainOverride>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(host, patch)| (host.to_lowercase(), patch))
            .collect();
        Self { base, overrides }
    }

    /// Builds the table from a loaded configuration
    ///
    /// The configuration's `[defaults]` section is applied on top of the
    /// built-in defaults to form the base policy.
    pub fn from_config(config: &Config) -> Self {
        let base = DomainConfig::default().merged(&config.defaults);
        Self::new(base, config.overrides.clone())
    }

    /// The policy used for domains without an override
    pub fn base(&self) -> &DomainConfig {
        &self.base
    }

    /// Resolves the policy for a domain root URL
    ///
    /// A root that does not parse as a URL is logged and resolves to the base
    /// policy; this never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use product_scout::config::{Config, PolicyTable};
    ///
    /// let table = PolicyTable::from_config(&Config::default());
    /// assert_eq!(table.resolve("https://www.virgio.com/").max_depth, 10);
    /// assert_eq!(table.resolve("https://unknown.example/").max_depth, 20);
    /// assert_eq!(table.resolve("not a url").max_depth, 20);
    /// ```
    pub fn resolve(&self, domain_root: &str) -> DomainConfig {
        let host = match extract_host(domain_root) {
            Ok(host) => host,
            Err(e) => {
                tracing::error!("Invalid domain URL {}: {}", domain_root, e);
                return self.base.clone();
            }
        };

        match self.overrides.get(&host) {
            Some(patch) => {
                tracing::debug!("Applying policy override for {}", host);
                self.base.merged(patch)
            }
            None => self.base.clone(),
        }
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::UrlPattern;

    #[test]
    fn test_resolve_built_in_overrides() {
        let table = PolicyTable::default();

        let tatacliq = table.resolve("https://www.tatacliq.com/");
        assert_eq!(tatacliq.concurrency_limit, 50);
        assert!(tatacliq.headful_fallback);
        assert_eq!(tatacliq.max_depth, 20);

        let nykaa = table.resolve("https://www.nykaafashion.com/");
        assert_eq!(nykaa.max_depth, 5);
        assert!(!nykaa.headful_fallback);

        let westside = table.resolve("https://www.westside.com/");
        assert_eq!(
            westside.exclude_url_patterns,
            vec![UrlPattern::new("/apps/buy/").unwrap()]
        );
        assert_eq!(westside.product_patterns, DomainConfig::default().product_patterns);
    }

    #[test]
    fn test_resolve_unknown_host_uses_base() {
        let table = PolicyTable::default();
        assert_eq!(table.resolve("https://shop.example/"), *table.base());
    }

    #[test]
    fn test_resolve_invalid_url_uses_base() {
        let table = PolicyTable::default();
        assert_eq!(table.resolve("://broken"), *table.base());
    }

    #[test]
    fn test_host_lookup_is_case_insensitive() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "Shop.Example".to_string(),
            DomainOverride {
                max_depth: Some(2),
                ..DomainOverride::default()
            },
        );
        let table = PolicyTable::new(DomainConfig::default(), overrides);
        assert_eq!(table.resolve("https://SHOP.example/").max_depth, 2);
    }

    #[test]
    fn test_config_defaults_feed_base() {
        let mut config = Config::default();
        config.defaults.min_links_threshold = Some(3);
        config.defaults.product_patterns = Some(vec![UrlPattern::new("/sku/").unwrap()]);

        let table = PolicyTable::from_config(&config);
        let virgio = table.resolve("https://www.virgio.com/");
        assert_eq!(virgio.min_links_threshold, 3);
        assert_eq!(virgio.max_depth, 10);
        assert_eq!(virgio.product_patterns, vec![UrlPattern::new("/sku/").unwrap()]);
    }
}
