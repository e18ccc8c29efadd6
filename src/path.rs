//! Shortest path result type

use std::fmt;

/// Titles from start to target, both inclusive.
///
/// Built once by [`NodeRegistry::path_to`](crate::storage::NodeRegistry::path_to)
/// and never mutated afterwards.
///
/// # Example
///
/// ```
/// use wikiwalk::Path;
///
/// let path = Path::from(vec!["Rust".to_string(), "Mozilla".to_string()]);
/// assert_eq!(path.hops(), 1);
/// assert_eq!(path.to_string(), "Rust -> Mozilla");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Number of titles on the path (never zero for a found path).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path holds no titles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of edges traversed.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// First title, if any.
    #[must_use]
    pub fn start(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Last title, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Titles in order.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.0
    }

    /// Iterate over titles in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

}

impl From<Vec<String>> for Path {
    fn from(titles: Vec<String>) -> Self {
        Self(titles)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" -> "))
    }
}
