use crate::state::{CrawlTask, DomainKey};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Pending crawl tasks in arrival order
///
/// The frontier is a single FIFO queue; it is partitioned by domain only
/// when a round drains it.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<CrawlTask>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task
    pub fn push(&self, task: CrawlTask) {
        self.queue.lock().push_back(task);
    }

    /// Appends several tasks, preserving their order
    pub fn extend(&self, tasks: impl IntoIterator<Item = CrawlTask>) {
        self.queue.lock().extend(tasks);
    }

    /// Removes and returns up to `limit` of the earliest tasks for `domain`
    ///
    /// Tasks of other domains keep their relative order.
    pub fn drain_domain(&self, domain: &DomainKey, limit: usize) -> Vec<CrawlTask> {
        let mut queue = self.queue.lock();
        let mut taken = Vec::new();
        if limit == 0 {
            return taken;
        }

        let mut remaining = VecDeque::with_capacity(queue.len());
        while let Some(task) = queue.pop_front() {
            if taken.len() < limit && &task.domain == domain {
                taken.push(task);
            } else {
                remaining.push_back(task);
            }
        }
        *queue = remaining;
        taken
    }

    /// Number of pending tasks for `domain`
    pub fn pending_for(&self, domain: &DomainKey) -> usize {
        self.queue
            .lock()
            .iter()
            .filter(|task| &task.domain == domain)
            .count()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
