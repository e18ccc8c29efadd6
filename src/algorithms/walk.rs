//! Frontier engine: shortest link path over a lazily discovered graph
//!
//! Breadth-first search where every node's edge list comes from a
//! [`NeighborSource`]. Expanding a node fans out one task per unvisited neighbor;
//! each task resolves the neighbor and drains its links, then reports back over a
//! channel. The walking task is the only writer of the visited set, the node
//! registry and the frontier queue; fan-out tasks compute but never commit.
//!
//! ```text
//!            ┌────────────── walking task ──────────────┐
//! frontier → │ pop top → filter visited → spawn fan-out │ → mpsc(n) → commit / found
//!            └──────────────────────────────────────────┘
//! ```
//!
//! Each node's fan-out is a barrier: the next node is not dequeued until every
//! task for the current one has reported, which keeps FIFO order equal to BFS
//! level order even though fetches complete out of order.
//!
//! When several shortest paths exist, the first one observed is returned. Sibling
//! completion order decides which, so the choice can differ between runs; the
//! length cannot.

use crate::error::{FetchError, Result, WalkError};
use crate::path::Path;
use crate::source::NeighborSource;
use crate::storage::{NodeId, NodeRegistry};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info};

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkConfig {
    /// Upper bound on concurrent neighbor fetches
    pub max_in_flight: usize,
    /// Longest path to consider, in hops (`None` = unbounded)
    pub max_depth: Option<usize>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            max_depth: None,
        }
    }
}

impl WalkConfig {
    /// Set the concurrent fetch limit (clamped to `1..=Semaphore::MAX_PERMITS`)
    #[must_use]
    pub const fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Bound the path length in hops
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

/// Passed to the progress hook once per dequeued node.
#[derive(Debug, Clone, Copy)]
pub struct ExpandEvent<'a> {
    /// Canonical title of the node being expanded
    pub title: &'a str,
    /// Hops from the start
    pub depth: usize,
    /// Number of outgoing links
    pub links: usize,
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Nodes dequeued from the frontier
    pub expanded: usize,
    /// Neighbor fetches dispatched
    pub dispatched: usize,
    /// Neighbors skipped because they were missing, ineligible or failed
    pub unavailable: usize,
    /// Neighbors discarded because their canonical title was already registered
    pub duplicates: usize,
}

type ProgressHook = Arc<dyn Fn(&ExpandEvent<'_>) + Send + Sync>;

/// What one fan-out task reports back.
enum Discovery {
    Target,
    Node { title: String, links: Vec<String> },
    Unavailable { title: String, error: FetchError },
}

/// Shortest-path walker over a [`NeighborSource`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wikiwalk::{source::MemoryGraph, Walker};
///
/// # tokio_test::block_on(async {
/// let graph = MemoryGraph::from_edge_list(&[("A", "B"), ("B", "C"), ("A", "X")]);
/// let walker = Walker::new(Arc::new(graph));
///
/// let path = walker.walk("A", "C").await.unwrap().unwrap();
/// assert_eq!(path.to_string(), "A -> B -> C");
///
/// assert!(walker.walk("C", "A").await.unwrap().is_none());
/// # });
/// ```
pub struct Walker<S: ?Sized> {
    source: Arc<S>,
    config: WalkConfig,
    on_expand: Option<ProgressHook>,
}

impl<S: ?Sized> fmt::Debug for Walker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Walker")
            .field("config", &self.config)
            .field("on_expand", &self.on_expand.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: NeighborSource + ?Sized + 'static> Walker<S> {
    /// Walker with default configuration
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            config: WalkConfig::default(),
            on_expand: None,
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: WalkConfig) -> Self {
        self.config = config;
        self
    }

    /// Call `hook` once per dequeued node. The hook cannot influence the walk.
    #[must_use]
    pub fn on_expand(mut self, hook: impl Fn(&ExpandEvent<'_>) + Send + Sync + 'static) -> Self {
        self.on_expand = Some(Arc::new(hook));
        self
    }

    /// Active configuration
    pub const fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Shortest path from `start` to `target`.
    ///
    /// Returns `Ok(None)` when the reachable part of the graph is exhausted (or the
    /// depth bound is hit) without reaching `target`.
    ///
    /// # Errors
    ///
    /// - [`WalkError::StartNotFound`] / [`WalkError::StartIneligible`] /
    ///   [`WalkError::StartUnavailable`] if the start cannot be fetched
    /// - [`WalkError::InternalInconsistency`] if the node registry is corrupted
    pub async fn walk(&self, start: &str, target: &str) -> Result<Option<Path>> {
        Ok(self.walk_with_stats(start, target).await?.0)
    }

    /// Like [`Walker::walk`], also returning counters.
    ///
    /// # Errors
    ///
    /// Same as [`Walker::walk`].
    pub async fn walk_with_stats(
        &self,
        start: &str,
        target: &str,
    ) -> Result<(Option<Path>, WalkStats)> {
        let mut stats = WalkStats::default();
        info!(start, target, "walk started");

        if start == target {
            let resolution = self
                .source
                .resolve(start)
                .await
                .map_err(|err| WalkError::from_start(start, err))?;
            if !resolution.eligible {
                return Err(WalkError::StartIneligible(start.to_string()));
            }
            return Ok((Some(Path::from(vec![start.to_string()])), stats));
        }

        let root = self
            .source
            .fetch_neighbors(start)
            .await
            .map_err(|err| WalkError::from_start(start, err))?;

        // Start differed from target only by normalization
        if root.title == target {
            return Ok((Some(Path::from(vec![root.title])), stats));
        }

        let mut registry = NodeRegistry::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(start.to_string());
        visited.insert(root.title.clone());

        let root_id = registry.insert_root(root.title, root.links);
        let mut frontier = VecDeque::from([root_id]);

        let permits = self.config.max_in_flight.clamp(1, Semaphore::MAX_PERMITS);
        let limiter = Arc::new(Semaphore::new(permits));
        let target: Arc<str> = Arc::from(target);

        while let Some(top) = frontier.pop_front() {
            let node = registry.get(top).ok_or_else(|| {
                WalkError::InternalInconsistency(format!("queued node {} is not registered", top.0))
            })?;
            let depth = node.depth();
            stats.expanded += 1;

            debug!(title = node.title(), depth, links = node.edges().len(), "expanding");
            if let Some(hook) = &self.on_expand {
                hook(&ExpandEvent {
                    title: node.title(),
                    depth,
                    links: node.edges().len(),
                });
            }

            if self.config.max_depth.is_some_and(|max| depth >= max) {
                continue;
            }

            // Admission happens here, on the walking task, before anything is in flight
            let pending: Vec<String> = node
                .edges()
                .iter()
                .filter(|link| visited.insert((*link).clone()))
                .cloned()
                .collect();
            if pending.is_empty() {
                continue;
            }

            stats.dispatched += pending.len();
            let mut results = self.fan_out(pending, &target, &limiter);

            while let Some(discovery) = results.recv().await {
                match discovery {
                    Discovery::Target => {
                        let path = registry.path_through(top, &target)?;
                        info!(
                            hops = path.hops(),
                            expanded = stats.expanded,
                            dispatched = stats.dispatched,
                            "path found"
                        );
                        // Dropping `results` abandons the remaining siblings
                        return Ok((Some(path), stats));
                    }
                    Discovery::Node { title, links } => {
                        visited.insert(title.clone());
                        match registry.insert(title, top, links)? {
                            Some(id) => frontier.push_back(id),
                            None => stats.duplicates += 1,
                        }
                    }
                    Discovery::Unavailable { title, error } => {
                        stats.unavailable += 1;
                        debug!(%title, %error, "neighbor unavailable");
                    }
                }
            }
        }

        info!(
            expanded = stats.expanded,
            dispatched = stats.dispatched,
            "frontier exhausted, no path"
        );
        Ok((None, stats))
    }

    /// Spawn one task per link; results arrive on a channel sized to the fan-out.
    fn fan_out(
        &self,
        links: Vec<String>,
        target: &Arc<str>,
        limiter: &Arc<Semaphore>,
    ) -> mpsc::Receiver<Discovery> {
        let (tx, rx) = mpsc::channel(links.len());

        for link in links {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let target = Arc::clone(target);
            let limiter = Arc::clone(limiter);

            tokio::spawn(async move {
                let Ok(_permit) = limiter.acquire_owned().await else {
                    return;
                };
                let discovery = discover(source.as_ref(), link, &target).await;
                // Receiver is gone once the target has been found elsewhere
                let _ = tx.send(discovery).await;
            });
        }

        rx
    }
}

/// Resolve one neighbor. The target only needs to exist and be eligible; every
/// other neighbor also has its links drained so the next level starts ready.
async fn discover<S: NeighborSource + ?Sized>(source: &S, link: String, target: &str) -> Discovery {
    if link == target {
        return match source.resolve(&link).await {
            Ok(resolution) if resolution.eligible => Discovery::Target,
            Ok(resolution) => Discovery::Unavailable {
                error: FetchError::Ineligible(resolution.title),
                title: link,
            },
            Err(error) => Discovery::Unavailable { title: link, error },
        };
    }

    match source.fetch_neighbors(&link).await {
        Ok(neighbors) if neighbors.title == target => Discovery::Target,
        Ok(neighbors) => Discovery::Node {
            title: neighbors.title,
            links: neighbors.links,
        },
        Err(error) => Discovery::Unavailable { title: link, error },
    }
}

/// Shortest path from `start` to `target` with default configuration.
///
/// # Errors
///
/// Same as [`Walker::walk`].
pub async fn walk<S: NeighborSource + ?Sized + 'static>(
    source: Arc<S>,
    start: &str,
    target: &str,
) -> Result<Option<Path>> {
    Walker::new(source).walk(start, target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryGraph;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// A → {B, C}, B → {D}, C → {D}, D → {}
    fn diamond() -> MemoryGraph {
        MemoryGraph::from_edge_list(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")])
    }

    fn assert_valid_path(graph: &MemoryGraph, path: &Path) {
        for pair in path.titles().windows(2) {
            let links = graph.graph().links(&pair[0]).unwrap();
            assert!(links.contains(&pair[1].as_str()), "{} -/-> {}", pair[0], pair[1]);
        }
    }

    #[tokio::test]
    async fn test_diamond_shortest() {
        let graph = Arc::new(diamond());
        let path = walk(Arc::clone(&graph), "A", "D").await.unwrap().unwrap();

        assert_eq!(path.len(), 3);
        assert_eq!(path.start(), Some("A"));
        assert_eq!(path.target(), Some("D"));
        assert_valid_path(&graph, &path);
    }

    #[tokio::test]
    async fn test_same_start_and_target() {
        let graph = Arc::new(diamond());
        let path = walk(Arc::clone(&graph), "A", "A").await.unwrap().unwrap();

        assert_eq!(path.titles(), &["A".to_string()]);
        // One resolve, no drain of A's links
        assert_eq!(graph.page_requests("A"), 1);
        assert_eq!(graph.total_requests(), 1);
    }

    #[tokio::test]
    async fn test_same_missing_start() {
        let graph = Arc::new(diamond());
        let err = walk(graph, "Q", "Q").await.unwrap_err();
        assert_eq!(err, WalkError::StartNotFound("Q".to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let graph = Arc::new(diamond());
        assert!(walk(graph, "A", "Z").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reverse_direction_unreachable() {
        let graph = Arc::new(diamond());
        assert!(walk(graph, "D", "A").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ineligible_start() {
        let graph = Arc::new(diamond().with_ineligible("Talk:A"));
        let err = walk(Arc::clone(&graph), "Talk:A", "D").await.unwrap_err();

        assert_eq!(err, WalkError::StartIneligible("Talk:A".to_string()));
        assert_eq!(graph.total_requests(), 1);
    }

    #[tokio::test]
    async fn test_missing_start() {
        let graph = Arc::new(diamond());
        let err = walk(graph, "Nowhere", "D").await.unwrap_err();
        assert_eq!(err, WalkError::StartNotFound("Nowhere".to_string()));
    }

    #[tokio::test]
    async fn test_failing_start_is_unavailable() {
        let graph = Arc::new(diamond().with_failure("A"));
        let err = walk(graph, "A", "D").await.unwrap_err();
        assert!(matches!(err, WalkError::StartUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_transient_neighbor_excluded() {
        let graph = Arc::new(diamond().with_failure("C"));
        let (path, stats) = Walker::new(Arc::clone(&graph))
            .walk_with_stats("A", "D")
            .await
            .unwrap();

        let path = path.unwrap();
        assert_eq!(path.to_string(), "A -> B -> D");
        assert_eq!(stats.unavailable, 1);
    }

    #[tokio::test]
    async fn test_ineligible_neighbor_excluded() {
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[
                ("A", "Category:X"),
                ("Category:X", "D"),
                ("A", "B"),
                ("B", "C"),
                ("C", "D"),
            ])
            .with_ineligible("Category:X"),
        );

        let path = walk(graph, "A", "D").await.unwrap().unwrap();
        assert_eq!(path.to_string(), "A -> B -> C -> D");
    }

    #[tokio::test]
    async fn test_ineligible_target_unreachable() {
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[("A", "Talk:B")]).with_ineligible("Talk:B"),
        );
        assert!(walk(graph, "A", "Talk:B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_each_title_fetched_once() {
        // Many parents share children; every title must be requested at most once
        let mut edges = Vec::new();
        for parent in ["P1", "P2", "P3", "P4"] {
            edges.push(("Root".to_string(), parent.to_string()));
            for child in ["X", "Y", "Z"] {
                edges.push((parent.to_string(), child.to_string()));
            }
        }
        edges.push(("X".to_string(), "Goal".to_string()));
        let graph = Arc::new(MemoryGraph::from_edge_list(&edges).with_page_size(1));

        let path = walk(Arc::clone(&graph), "Root", "Goal").await.unwrap().unwrap();
        assert_eq!(path.hops(), 3);

        for title in graph.graph().titles() {
            assert!(graph.fetches(title) <= 1, "{title} fetched {} times", graph.fetches(title));
        }
    }

    #[tokio::test]
    async fn test_pagination_drained_before_expansion() {
        // Target is only on A's last page
        let mut edges: Vec<(String, String)> =
            (0..9).map(|i| ("A".to_string(), format!("Filler {i}"))).collect();
        edges.push(("A".to_string(), "Goal".to_string()));
        let graph = Arc::new(MemoryGraph::from_edge_list(&edges).with_page_size(3));

        let path = walk(Arc::clone(&graph), "A", "Goal").await.unwrap().unwrap();
        assert_eq!(path.to_string(), "A -> Goal");
        assert_eq!(graph.page_requests("A"), 4);
    }

    #[tokio::test]
    async fn test_level_order_despite_latency() {
        // The 1-hop route goes through a slow node, the 3-hop route is fast
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[
                ("S", "Fast1"),
                ("S", "Slow"),
                ("Fast1", "Fast2"),
                ("Fast2", "T"),
                ("Slow", "T"),
            ])
            .with_latency("Slow", Duration::from_millis(50)),
        );

        let path = walk(graph, "S", "T").await.unwrap().unwrap();
        assert_eq!(path.to_string(), "S -> Slow -> T");
    }

    #[tokio::test]
    async fn test_max_depth_bounds_search() {
        let graph = Arc::new(MemoryGraph::from_edge_list(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
        ]));

        let config = WalkConfig::default().with_max_depth(2);
        let walker = Walker::new(Arc::clone(&graph)).with_config(config);
        assert!(walker.walk("A", "D").await.unwrap().is_none());
        assert_eq!(walker.walk("A", "C").await.unwrap().unwrap().hops(), 2);

        // C is never expanded, so D is never requested
        assert_eq!(graph.fetches("D"), 0);
    }

    #[tokio::test]
    async fn test_canonical_start_matches_target() {
        let graph = Arc::new(diamond().with_alias("a", "A"));
        let path = walk(graph, "a", "A").await.unwrap().unwrap();
        assert_eq!(path.titles(), &["A".to_string()]);
    }

    #[tokio::test]
    async fn test_alias_link_reaches_target() {
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[("A", "goal"), ("Goal", "A")]).with_alias("goal", "Goal"),
        );
        let path = walk(graph, "A", "Goal").await.unwrap().unwrap();
        assert_eq!(path.to_string(), "A -> Goal");
    }

    #[tokio::test]
    async fn test_alias_duplicates_discarded() {
        // Both links resolve to B; only one registry entry survives
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[("A", "b"), ("A", "B"), ("B", "C")])
                .with_alias("b", "B"),
        );
        let (path, stats) = Walker::new(graph).walk_with_stats("A", "Z").await.unwrap();

        assert!(path.is_none());
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.expanded, 3); // A, B, C
    }

    #[tokio::test]
    async fn test_progress_hook_sees_every_expansion() {
        let graph = Arc::new(diamond());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);

        let walker = Walker::new(graph).on_expand(move |event| {
            assert!(event.depth <= 2);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let (path, stats) = walker.walk_with_stats("A", "Z").await.unwrap();

        assert!(path.is_none());
        assert_eq!(seen.load(Ordering::SeqCst), 4);
        assert_eq!(stats.expanded, 4);
    }

    #[tokio::test]
    async fn test_single_in_flight_still_correct() {
        let graph = Arc::new(diamond().with_page_size(1));
        let walker = Walker::new(graph).with_config(WalkConfig::default().with_max_in_flight(1));

        let path = walker.walk("A", "D").await.unwrap().unwrap();
        assert_eq!(path.len(), 3);
    }

    #[tokio::test]
    async fn test_unbounded_in_flight_is_clamped() {
        let graph = Arc::new(diamond());
        let walker =
            Walker::new(graph).with_config(WalkConfig::default().with_max_in_flight(usize::MAX));

        let path = walker.walk("A", "D").await.unwrap().unwrap();
        assert_eq!(path.hops(), 2);
    }

    #[tokio::test]
    async fn test_target_returns_without_waiting_for_siblings() {
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[("A", "Slow"), ("A", "T"), ("Slow", "X")])
                .with_latency("Slow", Duration::from_secs(5)),
        );

        let started = std::time::Instant::now();
        let (path, stats) = Walker::new(Arc::clone(&graph))
            .walk_with_stats("A", "T")
            .await
            .unwrap();

        assert_eq!(path.unwrap().to_string(), "A -> T");
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(stats.expanded, 1);
        assert_eq!(stats.dispatched, 2);
        // Slow was requested but never drained into the frontier
        assert_eq!(graph.fetches("X"), 0);
    }

    #[tokio::test]
    async fn test_alias_spellings_fetched_once_each() {
        let graph = Arc::new(
            MemoryGraph::from_edge_list(&[("A", "b"), ("A", "B"), ("B", "C")])
                .with_alias("b", "B")
                .with_page_size(1),
        );
        let (_, stats) = Walker::new(Arc::clone(&graph))
            .walk_with_stats("A", "Z")
            .await
            .unwrap();

        // One drain per spelling, the second copy is discarded
        assert_eq!(graph.fetches("b"), 1);
        assert_eq!(graph.fetches("B"), 1);
        assert_eq!(graph.fetches("C"), 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[tokio::test]
    async fn test_canonical_title_blocks_later_link() {
        // B is registered at depth 1; C's link to B must not refetch it
        let graph = Arc::new(MemoryGraph::from_edge_list(&[
            ("A", "b"),
            ("A", "C"),
            ("C", "B"),
            ("B", "D"),
        ])
        .with_alias("b", "B"));
        let (path, stats) = Walker::new(Arc::clone(&graph))
            .walk_with_stats("A", "Z")
            .await
            .unwrap();

        assert!(path.is_none());
        assert_eq!(graph.fetches("B"), 0);
        assert_eq!(stats.duplicates, 0);
    }

    #[tokio::test]
    async fn test_self_loops_and_cycles_terminate() {
        let graph = Arc::new(MemoryGraph::from_edge_list(&[
            ("A", "A"),
            ("A", "B"),
            ("B", "A"),
            ("B", "B"),
        ]));
        assert!(walk(graph, "A", "Z").await.unwrap().is_none());
    }
}
