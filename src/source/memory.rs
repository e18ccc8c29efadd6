//! In-memory neighbor source over a [`CsrGraph`]
//!
//! Serves links in fixed-size pages with an `offset` continuation so the same
//! pagination drain as a remote source is exercised. Titles can be marked
//! ineligible, made to fail transiently, given artificial latency, or aliased
//! to a canonical title.

use super::{Continuation, LinkPage, NeighborSource, PageStatus};
use crate::error::FetchError;
use crate::storage::CsrGraph;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const OFFSET_KEY: &str = "offset";

/// CSR-backed [`NeighborSource`].
///
/// # Example
///
/// ```
/// use wikiwalk::source::{MemoryGraph, NeighborSource};
///
/// # tokio_test::block_on(async {
/// let graph = MemoryGraph::from_edge_list(&[("A", "B"), ("A", "C")]).with_page_size(1);
///
/// let neighbors = graph.fetch_neighbors("A").await.unwrap();
/// assert_eq!(neighbors.links, vec!["B", "C"]);
/// assert_eq!(graph.page_requests("A"), 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryGraph {
    graph: CsrGraph,
    ineligible: HashSet<String>,
    failing: HashSet<String>,
    aliases: HashMap<String, String>,
    latency: HashMap<String, Duration>,
    /// 0 serves every link list as one page
    page_size: usize,
    requests: Mutex<HashMap<String, RequestCount>>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RequestCount {
    first_pages: usize,
    pages: usize,
}

impl MemoryGraph {
    /// Wrap an existing link graph
    #[must_use]
    pub fn new(graph: CsrGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Build from `(source, target)` links
    #[must_use]
    pub fn from_edge_list<S: AsRef<str>>(edges: &[(S, S)]) -> Self {
        Self::new(CsrGraph::from_edge_list(edges))
    }

    /// Serve at most `page_size` links per page (0 = unpaged)
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Report `title` as existing but ineligible
    #[must_use]
    pub fn with_ineligible(mut self, title: &str) -> Self {
        self.graph.add_node(title);
        self.ineligible.insert(title.to_string());
        self
    }

    /// Fail every request for `title` with a transient error
    #[must_use]
    pub fn with_failure(mut self, title: &str) -> Self {
        self.failing.insert(title.to_string());
        self
    }

    /// Resolve requests for `alias` to the canonical `title`
    ///
    /// A walk only learns that two spellings name the same page by fetching
    /// them, so a page linked under both spellings from the same parent is
    /// requested once per spelling. The later copy is dropped as a duplicate.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, title: &str) -> Self {
        self.aliases.insert(alias.to_string(), title.to_string());
        self
    }

    /// Delay every page request for `title`
    #[must_use]
    pub fn with_latency(mut self, title: &str, delay: Duration) -> Self {
        self.latency.insert(title.to_string(), delay);
        self
    }

    /// Underlying link graph
    #[must_use]
    pub const fn graph(&self) -> &CsrGraph {
        &self.graph
    }

    /// Number of first-page requests for `title` (one per resolve or fetch)
    #[must_use]
    pub fn fetches(&self, title: &str) -> usize {
        self.count(title).first_pages
    }

    /// Total page requests for `title`, continuations included
    #[must_use]
    pub fn page_requests(&self, title: &str) -> usize {
        self.count(title).pages
    }

    /// Total page requests across all titles
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|c| c.pages)
            .sum()
    }

    fn count(&self, title: &str) -> RequestCount {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(title)
            .copied()
            .unwrap_or_default()
    }

    fn record(&self, title: &str, first_page: bool) {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        let count = requests.entry(title.to_string()).or_default();
        count.pages += 1;
        if first_page {
            count.first_pages += 1;
        }
    }
}

#[async_trait]
impl NeighborSource for MemoryGraph {
    async fn fetch_page(
        &self,
        title: &str,
        continuation: Option<&Continuation>,
    ) -> Result<LinkPage, FetchError> {
        self.record(title, continuation.is_none());

        if let Some(&delay) = self.latency.get(title) {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(title) {
            return Err(FetchError::Transient(format!("injected failure for {title}")));
        }

        let canonical = self.aliases.get(title).map_or(title, String::as_str);
        let Some(links) = self.graph.links(canonical) else {
            return Ok(LinkPage {
                title: canonical.to_string(),
                status: PageStatus::Missing,
                links: Vec::new(),
                next: None,
            });
        };

        let status = if self.ineligible.contains(canonical) {
            PageStatus::Ineligible
        } else {
            PageStatus::Content
        };

        let offset = match continuation.and_then(|c| c.get(OFFSET_KEY)) {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|_| FetchError::Transient(format!("bad offset {raw:?}")))?,
            None => 0,
        };
        let end = if self.page_size == 0 {
            links.len()
        } else {
            offset.saturating_add(self.page_size).min(links.len())
        };
        let page = links.get(offset..end).unwrap_or_default();
        let next = (end < links.len()).then(|| Continuation::new().with(OFFSET_KEY, end.to_string()));

        Ok(LinkPage {
            title: canonical.to_string(),
            status,
            links: page.iter().map(|s| (*s).to_string()).collect(),
            next,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_split_by_size() {
        let graph = MemoryGraph::from_edge_list(&[("A", "B"), ("A", "C"), ("A", "D")])
            .with_page_size(2);

        let first = graph.fetch_page("A", None).await.unwrap();
        assert_eq!(first.links, vec!["B", "C"]);
        let next = first.next.unwrap();
        assert_eq!(next.get("offset"), Some("2"));

        let second = graph.fetch_page("A", Some(&next)).await.unwrap();
        assert_eq!(second.links, vec!["D"]);
        assert!(second.next.is_none());

        assert_eq!(graph.fetches("A"), 1);
        assert_eq!(graph.page_requests("A"), 2);
    }

    #[tokio::test]
    async fn test_unknown_title_missing() {
        let graph = MemoryGraph::from_edge_list(&[("A", "B")]);
        let page = graph.fetch_page("Z", None).await.unwrap();
        assert_eq!(page.status, PageStatus::Missing);
        assert_eq!(graph.fetches("Z"), 1);
    }

    #[tokio::test]
    async fn test_ineligible_and_failing() {
        let graph = MemoryGraph::from_edge_list(&[("A", "Talk:A"), ("A", "B")])
            .with_ineligible("Talk:A")
            .with_failure("B");

        let page = graph.fetch_page("Talk:A", None).await.unwrap();
        assert_eq!(page.status, PageStatus::Ineligible);

        let err = graph.fetch_page("B", None).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_alias_reports_canonical_title() {
        let graph = MemoryGraph::from_edge_list(&[("Rust", "Mozilla")]).with_alias("rust", "Rust");

        let resolution = graph.resolve("rust").await.unwrap();
        assert_eq!(resolution.title, "Rust");
        assert!(resolution.eligible);
    }

    #[tokio::test]
    async fn test_bad_offset_is_transient() {
        let graph = MemoryGraph::from_edge_list(&[("A", "B")]);
        let bogus = Continuation::new().with("offset", "many");
        assert!(graph.fetch_page("A", Some(&bogus)).await.unwrap_err().is_transient());
    }

    #[tokio::test]
    async fn test_unpaged_by_default() {
        let edges: Vec<(String, String)> =
            (0..50).map(|i| ("Hub".to_string(), format!("Leaf {i}"))).collect();
        let graph = MemoryGraph::from_edge_list(&edges);

        let page = graph.fetch_page("Hub", None).await.unwrap();
        assert_eq!(page.links.len(), 50);
        assert!(page.next.is_none());
        assert_eq!(graph.total_requests(), 1);
    }
}
