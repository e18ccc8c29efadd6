//! CSR (Compressed Sparse Row) link graph keyed by title
//!
//! Backs the in-memory neighbor source. Titles are interned to dense vertex
//! indices; links are stored row by row.
//!
//! # CSR Format
//!
//! ```text
//! Links: A → B, A → C, B → C
//!
//! titles:      ["A", "B", "C"]
//! row_offsets: [0, 2, 3, 3]   // A: links [0..2), B: [2..3), C: [3..3)
//! col_indices: [1, 2, 2]
//! ```

use std::collections::HashMap;

/// Directed link graph in CSR layout.
///
/// # Example
///
/// ```
/// use wikiwalk::storage::CsrGraph;
///
/// let graph = CsrGraph::from_edge_list(&[("A", "B"), ("A", "C"), ("B", "C")]);
///
/// assert_eq!(graph.links("A"), Some(vec!["B", "C"]));
/// assert_eq!(graph.links("C"), Some(vec![]));
/// assert_eq!(graph.links("Z"), None);
/// ```
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// node i's links start at `row_offsets`[i]
    /// Length: `num_nodes` + 1
    row_offsets: Vec<u32>,

    /// Link targets as vertex indices
    /// Length: `num_edges`
    col_indices: Vec<u32>,

    /// Vertex index → title
    titles: Vec<String>,

    /// Title → vertex index
    index: HashMap<String, u32>,
}

impl CsrGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_offsets: vec![0],
            col_indices: Vec::new(),
            titles: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create graph from a list of `(source, target)` links.
    ///
    /// Link order per source is preserved; duplicate links are kept.
    #[must_use]
    pub fn from_edge_list<S: AsRef<str>>(edges: &[(S, S)]) -> Self {
        let mut graph = Self::new();

        // Intern every title first so rows can be laid out in one pass
        for (src, dst) in edges {
            graph.intern(src.as_ref());
            graph.intern(dst.as_ref());
        }

        let mut adj_list: Vec<Vec<u32>> = vec![Vec::new(); graph.titles.len()];
        for (src, dst) in edges {
            let s = graph.index[src.as_ref()];
            let d = graph.index[dst.as_ref()];
            adj_list[s as usize].push(d);
        }

        let mut offset = 0_u32;
        graph.row_offsets = Vec::with_capacity(adj_list.len() + 1);
        graph.row_offsets.push(offset);
        for neighbors in adj_list {
            #[allow(clippy::cast_possible_truncation)] // Graphs >4B links not supported
            let len_u32 = neighbors.len() as u32;
            offset += len_u32;
            graph.row_offsets.push(offset);
            graph.col_indices.extend(neighbors);
        }

        graph
    }

    /// Add a title with no outgoing links (no-op if already present)
    pub fn add_node(&mut self, title: &str) {
        self.intern(title);
    }

    /// Add a link (dynamic insertion)
    ///
    /// Note: For large graphs, use `from_edge_list` for better performance.
    pub fn add_edge(&mut self, src: &str, dst: &str) {
        let s = self.intern(src) as usize;
        let d = self.intern(dst);

        let end = self.row_offsets[s + 1] as usize;
        self.col_indices.insert(end, d);

        for offset in &mut self.row_offsets[s + 1..] {
            *offset += 1;
        }
    }

    /// Outgoing links of `title` in insertion order, `None` if the title is unknown
    #[must_use]
    pub fn links(&self, title: &str) -> Option<Vec<&str>> {
        let idx = *self.index.get(title)? as usize;
        Some(
            self.row(idx)
                .iter()
                .map(|&target| self.titles[target as usize].as_str())
                .collect(),
        )
    }

    /// Whether the title is a vertex of the graph
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.index.contains_key(title)
    }

    /// All titles, in vertex order
    pub fn titles(&self) -> impl Iterator<Item = &str> + '_ {
        self.titles.iter().map(String::as_str)
    }

    /// Get number of nodes
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.titles.len()
    }

    /// Get number of edges
    #[must_use]
    pub fn num_edges(&self) -> usize {
        self.col_indices.len()
    }

    /// Get CSR components
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32]) {
        (&self.row_offsets, &self.col_indices)
    }

    fn row(&self, idx: usize) -> &[u32] {
        let start = self.row_offsets[idx] as usize;
        let end = self.row_offsets[idx + 1] as usize;
        &self.col_indices[start..end]
    }

    fn intern(&mut self, title: &str) -> u32 {
        if let Some(&idx) = self.index.get(title) {
            return idx;
        }

        #[allow(clippy::cast_possible_truncation)]
        let idx = self.titles.len() as u32;
        self.titles.push(title.to_string());
        self.index.insert(title.to_string(), idx);

        // New vertex has an empty row ending where the last one ends
        let last_offset = *self.row_offsets.last().unwrap_or(&0);
        self.row_offsets.push(last_offset);
        idx
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}
