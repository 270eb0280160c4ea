use crate::ConfigError;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A compiled URL matcher used for product and exclusion rules
///
/// Patterns are unanchored regular expressions tested against the full
/// normalized URL string, so `/p/` matches anywhere in the URL.
#[derive(Clone)]
pub struct UrlPattern {
    regex: Regex,
}

impl UrlPattern {
    /// Compiles a pattern
    ///
    /// # Examples
    ///
    /// ```
    /// use product_scout::url::UrlPattern;
    ///
    /// let pattern = UrlPattern::new(r"/p-[a-zA-Z0-9]+").unwrap();
    /// assert!(pattern.is_match("https://shop.example/p-abc123"));
    /// assert!(!pattern.is_match("https://shop.example/about"));
    /// ```
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|e| ConfigError::InvalidPattern(format!("{}: {}", pattern, e)))
    }

    /// Returns true if the pattern matches anywhere in `candidate`
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    /// The source text of the pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlPattern").field(&self.as_str()).finish()
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq for UrlPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for UrlPattern {}

impl<'de> Deserialize<'de> for UrlPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        UrlPattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// Returns the first pattern that matches `candidate`, if any
pub fn first_match<'a>(patterns: &'a [UrlPattern], candidate: &str) -> Option<&'a UrlPattern> {
    patterns.iter().find(|pattern| pattern.is_match(candidate))
}
