//! Node registry: append-only arena of discovered nodes and parent links
//!
//! Every node is owned by the arena and refers to its discoverer by index, so the
//! parent structure is a forest pointing strictly backwards:
//!
//! ```text
//! arena:   [0] A (root)   [1] B → 0   [2] C → 0   [3] D → 1
//! path_to(3):  D → B → A  → reversed  A, B, D
//! ```

use crate::error::{Result, WalkError};
use crate::path::Path;
use std::collections::HashMap;

/// Arena index of a discovered node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One discovered node.
///
/// Immutable after insertion: the parent is fixed by whoever discovered the node
/// first and the edge list is assigned in the same step.
#[derive(Debug, Clone)]
pub struct NodeEntry {
    title: String,
    parent: Option<NodeId>,
    depth: usize,
    edges: Vec<String>,
}

impl NodeEntry {
    /// Canonical title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Discoverer, `None` for the root
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Hops from the root
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Fully drained outgoing links
    #[must_use]
    pub fn edges(&self) -> &[String] {
        &self.edges
    }
}

/// Arena of nodes discovered during one walk.
///
/// # Example
///
/// ```
/// use wikiwalk::storage::NodeRegistry;
///
/// let mut registry = NodeRegistry::new();
/// let a = registry.insert_root("A".to_string(), vec!["B".to_string()]);
/// let b = registry.insert("B".to_string(), a, vec![]).unwrap().unwrap();
///
/// let path = registry.path_to(b).unwrap();
/// assert_eq!(path.to_string(), "A -> B");
/// ```
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: Vec<NodeEntry>,
    by_title: HashMap<String, NodeId>,
}

impl NodeRegistry {
    /// Create empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the walk's root node.
    ///
    /// If the title is already registered its existing id is returned unchanged.
    pub fn insert_root(&mut self, title: String, edges: Vec<String>) -> NodeId {
        if let Some(&id) = self.by_title.get(&title) {
            return id;
        }
        self.push(title, None, 0, edges)
    }

    /// Insert a node discovered from `parent`.
    ///
    /// Returns `Ok(None)` if the title is already registered (first writer wins,
    /// the caller's copy is discarded).
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InternalInconsistency`] if `parent` is not in the arena.
    pub fn insert(
        &mut self,
        title: String,
        parent: NodeId,
        edges: Vec<String>,
    ) -> Result<Option<NodeId>> {
        let depth = self
            .get(parent)
            .ok_or_else(|| {
                WalkError::InternalInconsistency(format!(
                    "parent {} of {title} is not registered",
                    parent.0
                ))
            })?
            .depth
            + 1;

        if self.by_title.contains_key(&title) {
            return Ok(None);
        }
        Ok(Some(self.push(title, Some(parent), depth, edges)))
    }

    fn push(
        &mut self,
        title: String,
        parent: Option<NodeId>,
        depth: usize,
        edges: Vec<String>,
    ) -> NodeId {
        #[allow(clippy::cast_possible_truncation)] // Walks beyond 4B nodes are not supported
        let id = NodeId(self.nodes.len() as u32);
        self.by_title.insert(title.clone(), id);
        self.nodes.push(NodeEntry {
            title,
            parent,
            depth,
            edges,
        });
        id
    }

    /// Look up a node
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeEntry> {
        self.nodes.get(id.index())
    }

    /// Look up a node id by title
    #[must_use]
    pub fn id_of(&self, title: &str) -> Option<NodeId> {
        self.by_title.get(title).copied()
    }

    /// Number of registered nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reconstruct the path from the root to `id`.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InternalInconsistency`] if the parent chain dangles or
    /// loops. Walks longer than the arena itself can only come from a cycle.
    pub fn path_to(&self, id: NodeId) -> Result<Path> {
        Ok(Path::from(self.chain(id, Vec::new())?))
    }

    /// Reconstruct the path from the root through `parent` to an unregistered
    /// terminal title.
    ///
    /// Used when the target is reached: it is never expanded, so it never needs an
    /// arena slot.
    ///
    /// # Errors
    ///
    /// Same as [`NodeRegistry::path_to`].
    pub fn path_through(&self, parent: NodeId, terminal: &str) -> Result<Path> {
        Ok(Path::from(self.chain(parent, vec![terminal.to_string()])?))
    }

    fn chain(&self, id: NodeId, mut titles: Vec<String>) -> Result<Vec<String>> {
        let mut current = Some(id);
        let mut steps = 0_usize;

        while let Some(node_id) = current {
            let node = self.get(node_id).ok_or_else(|| {
                WalkError::InternalInconsistency(format!("dangling parent link {}", node_id.0))
            })?;

            steps += 1;
            if steps > self.nodes.len() {
                return Err(WalkError::InternalInconsistency(format!(
                    "parent chain from {} loops",
                    node.title
                )));
            }

            titles.push(node.title.clone());
            current = node.parent;
        }

        titles.reverse();
        Ok(titles)
    }
}
