//! Round-based frontier scheduler
//!
//! This module handles:
//! - Seeding one depth-1 task per configured domain
//! - Draining a batch per domain each round, bounded by its concurrency limit
//! - Per-domain concurrency gates around every dispatched task
//! - Depth and visited checks at processing time
//! - Feeding product links to the result aggregator after each round

use crate::config::{validate_domain_config, DomainConfig, PolicyTable};
use crate::crawler::strategy::FetchStrategy;
use crate::output::{CrawlStatistics, ResultAggregator};
use crate::state::{CrawlTask, DomainKey, Frontier, VisitedSet};
use crate::url::NormalizedUrl;
use crate::ConfigError;
use futures::future::join_all;
use std::time::Instant;
use tokio::sync::Semaphore;
use url::Url;

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// The frontier still holds tasks
    Running,
    /// The frontier is empty
    Done,
}

/// Why a task contributed nothing without being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    DepthExceeded,
    AlreadyVisited,
}

/// Result of processing one task
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Dropped(DropReason),
    Expanded {
        products: Vec<NormalizedUrl>,
        enqueued: usize,
    },
    /// Fetching failed in every permitted mode
    Failed,
}

/// A configured domain with its resolved policy
struct DomainSlot {
    key: DomainKey,
    root: Url,
    config: DomainConfig,
    gate: Semaphore,
}

/// Scheduler owns the frontier and visited set of one crawl run
///
/// The scheduler coordinates:
/// - Round-based draining (strict barrier between rounds)
/// - Per-domain batch sizes and concurrency gates
/// - Depth bounding and at-most-once fetching of each normalized URL
pub struct Scheduler {
    domains: Vec<DomainSlot>,
    frontier: Frontier,
    visited: VisitedSet,
    strategy: FetchStrategy,
}

impl Scheduler {
    /// Creates a scheduler and seeds its frontier
    ///
    /// # Arguments
    ///
    /// * `domains` - Domain root URLs, in crawl order
    /// * `policies` - Resolves each domain's policy
    /// * `strategy` - Fetches and classifies pages
    ///
    /// # Returns
    ///
    /// * `Ok(Scheduler)` - One seed task queued per domain
    /// * `Err(ConfigError)` - A domain root is not an absolute URL, or its
    ///   resolved policy is unusable (for example a zero concurrency limit)
    pub fn new(
        domains: &[String],
        policies: &PolicyTable,
        strategy: FetchStrategy,
    ) -> Result<Self, ConfigError> {
        let mut slots = Vec::with_capacity(domains.len());

        for domain in domains {
            let root = Url::parse(domain)
                .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", domain, e)))?;
            let config = policies.resolve(domain);
            validate_domain_config(domain, &config)?;

            tracing::debug!(
                "Domain {}: concurrency {}, max depth {}, headful fallback {}",
                domain,
                config.concurrency_limit,
                config.max_depth,
                config.headful_fallback
            );

            slots.push(DomainSlot {
                key: DomainKey::new(domain),
                root,
                gate: Semaphore::new(config.concurrency_limit),
                config,
            });
        }

        let frontier = Frontier::new();
        frontier.extend(slots.iter().map(|slot| CrawlTask::seed(&slot.key)));

        Ok(Self {
            domains: slots,
            frontier,
            visited: VisitedSet::new(),
            strategy,
        })
    }

    pub fn state(&self) -> SchedulerState {
        if self.frontier.is_empty() {
            SchedulerState::Done
        } else {
            SchedulerState::Running
        }
    }

    /// Configured domains, in crawl order
    pub fn domains(&self) -> impl Iterator<Item = &DomainKey> {
        self.domains.iter().map(|slot| &slot.key)
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Runs rounds until the frontier is empty
    ///
    /// Each round drains up to `concurrency_limit` tasks per domain,
    /// dispatches them all concurrently and waits for every one of them.
    /// Product links of expanded tasks are handed to `results` once the
    /// round has finished.
    pub async fn run(&self, results: &mut ResultAggregator) -> CrawlStatistics {
        let started = Instant::now();
        let mut stats = CrawlStatistics::default();

        tracing::info!("Starting crawl of {} domains", self.domains.len());

        while self.state() == SchedulerState::Running {
            let mut round = Vec::new();
            for slot in &self.domains {
                for task in self
                    .frontier
                    .drain_domain(&slot.key, slot.config.concurrency_limit)
                {
                    round.push(async move {
                        let outcome = self.process_task(slot, &task).await;
                        (task.domain, outcome)
                    });
                }
            }

            if round.is_empty() {
                tracing::warn!(
                    "{} queued tasks belong to no configured domain, stopping",
                    self.frontier.len()
                );
                break;
            }

            stats.rounds += 1;
            tracing::debug!("Round {}: dispatching {} tasks", stats.rounds, round.len());

            for (domain, outcome) in join_all(round).await {
                match outcome {
                    TaskOutcome::Expanded { products, enqueued } => {
                        stats.pages_fetched += 1;
                        stats.links_enqueued += enqueued as u64;
                        results.accept(&domain, &products);
                    }
                    TaskOutcome::Dropped(DropReason::DepthExceeded) => stats.dropped_depth += 1,
                    TaskOutcome::Dropped(DropReason::AlreadyVisited) => stats.dropped_visited += 1,
                    TaskOutcome::Failed => stats.failed_tasks += 1,
                }
            }

            let queued = self.frontier.len();
            if queued % 10 == 0 {
                tracing::info!(
                    "Queue: {}, Visited: {}, Products found: {}",
                    queued,
                    self.visited.len(),
                    results.total()
                );
            } else {
                tracing::debug!(
                    "Queue: {}, Visited: {}, Products found: {}",
                    queued,
                    self.visited.len(),
                    results.total()
                );
            }
        }

        let counters = self.strategy.counters();
        stats.headless_fetches = counters.headless_fetches;
        stats.headful_fetches = counters.headful_fetches;
        stats.products_per_domain = self
            .domains()
            .map(|domain| (domain.to_string(), results.products(domain).len()))
            .collect();
        stats.elapsed = started.elapsed();

        tracing::info!(
            "Crawl completed: visited {} URLs in {} rounds ({:?})",
            self.visited.len(),
            stats.rounds,
            stats.elapsed
        );

        stats
    }

    /// Processes one task under its domain's gate
    async fn process_task(&self, slot: &DomainSlot, task: &CrawlTask) -> TaskOutcome {
        let _permit = match slot.gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!("Concurrency gate for {} unavailable: {}", slot.key, e);
                return TaskOutcome::Failed;
            }
        };

        if task.depth > slot.config.max_depth {
            tracing::trace!("Dropping {} at depth {}", task.url, task.depth);
            return TaskOutcome::Dropped(DropReason::DepthExceeded);
        }

        if !self.visited.insert(NormalizedUrl::new(&task.url)) {
            tracing::trace!("Dropping already visited {}", task.url);
            return TaskOutcome::Dropped(DropReason::AlreadyVisited);
        }

        tracing::debug!("Crawling {} (depth {})", task.url, task.depth);

        match self
            .strategy
            .discover(&task.url, &slot.root, &slot.config, &self.visited)
            .await
        {
            Ok(links) => {
                let enqueued = links.crawlable.len();
                self.frontier.extend(
                    links
                        .crawlable
                        .into_iter()
                        .map(|url| task.child(url.into_string())),
                );

                TaskOutcome::Expanded {
                    products: links.products,
                    enqueued,
                }
            }
            Err(e) => {
                tracing::warn!("No links from {}: {}", task.url, e);
                TaskOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainOverride;
    use crate::crawler::browser::{BrowserPool, FetchMode};
    use crate::crawler::mock_browser::MockLauncher;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    const ROOT: &str = "https://shop.example/";

    async fn scheduler(launcher: &MockLauncher, config: DomainConfig) -> Scheduler {
        let pool = BrowserPool::open(Arc::new(launcher.clone())).await.unwrap();
        let policies = PolicyTable::new(config, HashMap::new());
        Scheduler::new(&[ROOT.to_string()], &policies, FetchStrategy::new(Arc::new(pool))).unwrap()
    }

    async fn multi_domain_scheduler(
        launcher: &MockLauncher,
        roots: &[&str],
        overrides: HashMap<String, DomainOverride>,
    ) -> Scheduler {
        let pool = BrowserPool::open(Arc::new(launcher.clone())).await.unwrap();
        let policies = PolicyTable::new(DomainConfig::default(), overrides);
        let roots: Vec<String> = roots.iter().map(|root| root.to_string()).collect();
        Scheduler::new(&roots, &policies, FetchStrategy::new(Arc::new(pool))).unwrap()
    }

    fn key() -> DomainKey {
        DomainKey::new(ROOT)
    }

    #[tokio::test]
    async fn test_seeded_then_done() {
        let launcher = MockLauncher::new();
        launcher.page(ROOT, "<html></html>");
        let scheduler = scheduler(&launcher, DomainConfig::default()).await;

        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert_eq!(scheduler.pending(), 1);

        let mut results = ResultAggregator::with_domains(scheduler.domains());
        let stats = scheduler.run(&mut results).await;

        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert_eq!(stats.rounds, 1);
        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(stats.products_per_domain, vec![(ROOT.to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_depth_bound_drops_children() {
        let launcher = MockLauncher::new();
        launcher
            .page(ROOT, r#"<a href="/women">W</a><a href="/men">M</a><a href="/p/1">P</a>"#)
            .page("https://shop.example/women", r#"<a href="/p/2">P</a>"#);
        let config = DomainConfig {
            max_depth: 1,
            ..DomainConfig::default()
        };
        let scheduler = scheduler(&launcher, config).await;

        let mut results = ResultAggregator::new();
        let stats = scheduler.run(&mut results).await;

        assert_eq!(launcher.fetches("https://shop.example/women", FetchMode::Headless), 0);
        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(stats.links_enqueued, 2);
        assert_eq!(stats.dropped_depth, 2);
        assert_eq!(results.products(&key()), &[NormalizedUrl::new("https://shop.example/p/1")]);
    }

    #[tokio::test]
    async fn test_each_url_fetched_once() {
        let launcher = MockLauncher::new();
        launcher
            .page(ROOT, r#"<a href="/a">A</a><a href="/b">B</a>"#)
            .page("https://shop.example/a", r#"<a href="/b">B</a><a href="/">Home</a>"#)
            .page("https://shop.example/b", r#"<a href="/a/">A</a><a href="/p/7">P</a>"#);
        let scheduler = scheduler(&launcher, DomainConfig::default()).await;

        let mut results = ResultAggregator::new();
        scheduler.run(&mut results).await;

        for url in [ROOT, "https://shop.example/a", "https://shop.example/b"] {
            assert_eq!(launcher.fetches(url, FetchMode::Headless), 1, "{}", url);
        }
        assert_eq!(scheduler.visited_count(), 3);
        assert_eq!(results.products(&key()), &[NormalizedUrl::new("https://shop.example/p/7")]);
    }

    #[tokio::test]
    async fn test_failed_task_does_not_stop_the_run() {
        let launcher = MockLauncher::new();
        launcher
            .page(ROOT, r#"<a href="/broken">X</a><a href="/ok">Ok</a>"#)
            .page("https://shop.example/ok", r#"<a href="/p/5">P</a>"#);
        let scheduler = scheduler(&launcher, DomainConfig::default()).await;

        let mut results = ResultAggregator::new();
        let stats = scheduler.run(&mut results).await;

        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(scheduler.state(), SchedulerState::Done);
        assert_eq!(results.products(&key()), &[NormalizedUrl::new("https://shop.example/p/5")]);
    }

    #[tokio::test]
    async fn test_rounds_bounded_by_concurrency_limit() {
        let launcher = MockLauncher::new();
        launcher
            .page(
                ROOT,
                r#"<a href="/a">A</a><a href="/b">B</a><a href="/c">C</a><a href="/d">D</a><a href="/e">E</a>"#,
            )
            .with_delay(Duration::from_millis(20));
        for path in ["a", "b", "c", "d", "e"] {
            launcher.page(&format!("https://shop.example/{}", path), "<html></html>");
        }
        let config = DomainConfig {
            concurrency_limit: 2,
            ..DomainConfig::default()
        };
        let scheduler = scheduler(&launcher, config).await;

        let mut results = ResultAggregator::new();
        let stats = scheduler.run(&mut results).await;

        assert_eq!(stats.rounds, 4);
        assert_eq!(stats.pages_fetched, 6);
        assert!(launcher.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn test_invalid_domain_root() {
        let launcher = MockLauncher::new();
        let pool = BrowserPool::open(Arc::new(launcher)).await.unwrap();
        let result = Scheduler::new(
            &["not a url".to_string()],
            &PolicyTable::default(),
            FetchStrategy::new(Arc::new(pool)),
        );
        assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_domains_use_their_own_policies() {
        let launcher = MockLauncher::new();
        launcher
            .page(
                "https://a.example/",
                r#"<a href="/x">X</a><a href="/y">Y</a><a href="/p/a1">P</a>"#,
            )
            .page("https://a.example/x", r#"<a href="/p/a2">P</a><a href="/z">Z</a>"#)
            .page("https://a.example/y", r#"<a href="/p/a3">P</a>"#)
            .page("https://b.example/", r#"<a href="/p/b1">P</a><a href="/w">W</a>"#);

        let mut overrides = HashMap::new();
        overrides.insert(
            "a.example".to_string(),
            DomainOverride {
                concurrency_limit: Some(1),
                max_depth: Some(2),
                ..DomainOverride::default()
            },
        );
        overrides.insert(
            "b.example".to_string(),
            DomainOverride {
                max_depth: Some(1),
                ..DomainOverride::default()
            },
        );
        let scheduler =
            multi_domain_scheduler(&launcher, &["https://a.example/", "https://b.example/"], overrides)
                .await;

        let mut results = ResultAggregator::with_domains(scheduler.domains());
        let stats = scheduler.run(&mut results).await;

        // a.example takes one task per round: seed, /x, /y, then /z over depth
        assert_eq!(stats.rounds, 4);
        assert_eq!(stats.dropped_depth, 2);
        assert_eq!(launcher.fetches("https://a.example/z", FetchMode::Headless), 0);
        assert_eq!(launcher.fetches("https://b.example/w", FetchMode::Headless), 0);
        assert_eq!(
            results.products(&DomainKey::new("https://a.example/")),
            &[
                NormalizedUrl::new("https://a.example/p/a1"),
                NormalizedUrl::new("https://a.example/p/a2"),
                NormalizedUrl::new("https://a.example/p/a3"),
            ]
        );
        assert_eq!(
            results.products(&DomainKey::new("https://b.example/")),
            &[NormalizedUrl::new("https://b.example/p/b1")]
        );
        assert_eq!(
            stats.products_per_domain,
            vec![
                ("https://a.example/".to_string(), 3),
                ("https://b.example/".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_visited_set_shared_across_domains() {
        let launcher = MockLauncher::new();
        launcher
            .page("https://shop.example/", r#"<a href="/sale">Sale</a><a href="/p/1">P</a>"#)
            .page("https://shop.example/sale", r#"<a href="/p/9">P</a>"#);

        let scheduler = multi_domain_scheduler(
            &launcher,
            &["https://shop.example/", "https://shop.example/sale"],
            HashMap::new(),
        )
        .await;

        let mut results = ResultAggregator::with_domains(scheduler.domains());
        scheduler.run(&mut results).await;

        // Reached as the second seed and as a link of the first
        assert_eq!(launcher.fetches("https://shop.example/sale", FetchMode::Headless), 1);
        assert_eq!(scheduler.visited_count(), 2);
        assert_eq!(
            results.products(&DomainKey::new("https://shop.example/sale")),
            &[NormalizedUrl::new("https://shop.example/p/9")]
        );
    }

    #[tokio::test]
    async fn test_equivalent_roots_fetched_once() {
        let launcher = MockLauncher::new();
        launcher.page("https://shop.example/", r#"<a href="/p/1">P</a>"#);

        let scheduler = multi_domain_scheduler(
            &launcher,
            &["https://shop.example/", "https://shop.example"],
            HashMap::new(),
        )
        .await;

        let mut results = ResultAggregator::with_domains(scheduler.domains());
        let stats = scheduler.run(&mut results).await;

        assert_eq!(stats.rounds, 1);
        assert_eq!(stats.pages_fetched, 1);
        assert_eq!(stats.dropped_visited, 1);
        assert_eq!(launcher.total_fetches(FetchMode::Headless), 1);
    }

    #[tokio::test]
    async fn test_zero_concurrency_limit_rejected() {
        let launcher = MockLauncher::new();
        let pool = BrowserPool::open(Arc::new(launcher.clone())).await.unwrap();
        let config = DomainConfig {
            concurrency_limit: 0,
            ..DomainConfig::default()
        };
        let result = Scheduler::new(
            &[ROOT.to_string()],
            &PolicyTable::new(config, HashMap::new()),
            FetchStrategy::new(Arc::new(pool)),
        );

        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert_eq!(launcher.total_fetches(FetchMode::Headless), 0);
    }

    #[tokio::test]
    async fn test_zero_depth_override_rejected() {
        let launcher = MockLauncher::new();
        let pool = BrowserPool::open(Arc::new(launcher)).await.unwrap();
        let mut overrides = HashMap::new();
        overrides.insert(
            "b.example".to_string(),
            DomainOverride {
                max_depth: Some(0),
                ..DomainOverride::default()
            },
        );
        let result = Scheduler::new(
            &["https://a.example/".to_string(), "https://b.example/".to_string()],
            &PolicyTable::new(DomainConfig::default(), overrides),
            FetchStrategy::new(Arc::new(pool)),
        );

        assert!(matches!(result, Err(ConfigError::Validation(message)) if message.contains("b.example")));
    }
}
