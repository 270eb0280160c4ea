//! State module for tracking crawl progress
//!
//! This module provides the shared mutable state of one crawl run.
//!
//! # Components
//!
//! - `CrawlTask`: a pending visit of one URL at a given depth for one domain
//! - `Frontier`: FIFO collection of pending tasks, drained per domain
//! - `VisitedSet`: process-wide set of normalized URLs already accepted
//!
//! Both collections are guarded by a single mutex each, so check-and-insert
//! and drain operations are atomic under multi-threaded execution.

mod frontier;
mod task;
mod visited;

// Re-export main types
pub use frontier::Frontier;
pub use task::{CrawlTask, DomainKey};
pub use visited::VisitedSet;
