use std::fmt;
use std::sync::Arc;

/// Identifies a configured domain by its root URL string
///
/// The key is the domain string exactly as configured (for example
/// `https://www.example.com/`). It is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainKey(Arc<str>);

impl DomainKey {
    pub fn new(root: &str) -> Self {
        Self(Arc::from(root))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DomainKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

/// A pending visit of one URL
///
/// Tasks are created at seed time (depth 1) or when a crawlable link is
/// found (parent depth + 1). They are consumed exactly once when drained
/// into a round and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to visit
    pub url: String,

    /// Distance from the seed, starting at 1
    pub depth: u32,

    /// The domain this task belongs to
    pub domain: DomainKey,
}

impl CrawlTask {
    /// Creates the depth-1 seed task for a domain
    pub fn seed(domain: &DomainKey) -> Self {
        Self {
            url: domain.as_str().to_string(),
            depth: 1,
            domain: domain.clone(),
        }
    }

    /// Creates a task for a link discovered while processing `self`
    pub fn child(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth: self.depth + 1,
            domain: self.domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_task() {
        let domain = DomainKey::new("https://shop.example/");
        let seed = CrawlTask::seed(&domain);
        assert_eq!(seed.url, "https://shop.example/");
        assert_eq!(seed.depth, 1);
        assert_eq!(seed.domain, domain);
    }

    #[test]
    fn test_child_task_increments_depth() {
        let seed = CrawlTask::seed(&DomainKey::new("https://shop.example/"));
        let child = seed.child("https://shop.example/women");
        let grandchild = child.child("https://shop.example/women/tops");

        assert_eq!(child.depth, 2);
        assert_eq!(grandchild.depth, 3);
        assert_eq!(grandchild.domain, seed.domain);
    }
}
