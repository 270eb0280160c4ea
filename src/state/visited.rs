use crate::url::NormalizedUrl;
use parking_lot::Mutex;
use std::collections::HashSet;

/// Process-wide set of normalized URLs accepted for processing
///
/// The set is shared by every domain of a run and is not partitioned by
/// origin. URLs are never removed.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<NormalizedUrl>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url`, returning true if it was not already present
    ///
    /// Check and insert happen under one lock, so two tasks racing on the
    /// same URL cannot both win.
    pub fn insert(&self, url: NormalizedUrl) -> bool {
        self.urls.lock().insert(url)
    }

    pub fn contains(&self, url: &NormalizedUrl) -> bool {
        self.urls.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.lock().is_empty()
    }
}
