//! Synchronous traversal over a fully materialized [`CsrGraph`]
//!
//! Plain queue-based BFS with no fetching, no eligibility and no concurrency.
//! Serves as the distance oracle the concurrent walk is checked against.

use crate::storage::CsrGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Breadth-First Search from source title
///
/// Returns every title reachable from `source` (including `source` itself), in
/// BFS order. Empty if `source` is not in the graph.
///
/// # Example
///
/// ```
/// use wikiwalk::{bfs, storage::CsrGraph};
///
/// let graph = CsrGraph::from_edge_list(&[("A", "B"), ("B", "C")]);
///
/// let reachable = bfs(&graph, "A");
/// assert_eq!(reachable, vec!["A", "B", "C"]);
/// ```
#[must_use]
pub fn bfs<'g>(graph: &'g CsrGraph, source: &str) -> Vec<&'g str> {
    let Some(start) = graph.titles().find(|t| *t == source) else {
        return Vec::new();
    };

    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    let mut order = Vec::new();

    while let Some(current) = queue.pop_front() {
        order.push(current);
        for neighbor in graph.links(current).unwrap_or_default() {
            if visited.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    order
}

/// Unweighted distance in hops from `source` to `target`
///
/// `None` if `target` is unreachable or either title is unknown.
///
/// # Example
///
/// ```
/// use wikiwalk::{bfs_distance, storage::CsrGraph};
///
/// let graph = CsrGraph::from_edge_list(&[("A", "B"), ("B", "C"), ("A", "C")]);
/// assert_eq!(bfs_distance(&graph, "A", "C"), Some(1));
/// assert_eq!(bfs_distance(&graph, "C", "A"), None);
/// ```
#[must_use]
pub fn bfs_distance(graph: &CsrGraph, source: &str, target: &str) -> Option<usize> {
    if !graph.contains(source) {
        return None;
    }
    if source == target {
        return Some(0);
    }

    let mut depth: HashMap<&str, usize> = HashMap::from([(source, 0)]);
    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        let next_depth = depth[current] + 1;
        for neighbor in graph.links(current).unwrap_or_default() {
            if depth.contains_key(neighbor) {
                continue;
            }
            if neighbor == target {
                return Some(next_depth);
            }
            depth.insert(neighbor, next_depth);
            queue.push_back(neighbor);
        }
    }

    None
}
