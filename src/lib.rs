//! wikiwalk: shortest link paths between wiki articles
//!
//! # Overview
//!
//! Finds the shortest chain of links from one article to another in a graph that
//! is far too large to download: edges are discovered on demand from a paginated
//! [`NeighborSource`], and each node's neighbors are resolved concurrently while
//! the breadth-first order is kept intact.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use wikiwalk::{source::MemoryGraph, walk};
//!
//! # tokio_test::block_on(async {
//! // A → {B, C}, B → {D}, C → {D}
//! let graph = MemoryGraph::from_edge_list(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")])
//!     .with_page_size(1); // serve one link per page
//!
//! let path = walk(Arc::new(graph), "A", "D").await.unwrap().unwrap();
//! assert_eq!(path.hops(), 2);
//! # });
//! ```
//!
//! Against a live wiki (feature `mediawiki`):
//!
//! ```no_run
//! use std::sync::Arc;
//! use wikiwalk::source::{MediaWikiConfig, MediaWikiSource, RetryPolicy, Retrying};
//! use wikiwalk::Walker;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Retrying::new(MediaWikiSource::new(MediaWikiConfig::default())?, RetryPolicy::default());
//! match Walker::new(Arc::new(source)).walk("Rust (programming language)", "Mozilla").await? {
//!     Some(path) => println!("{path}"),
//!     None => println!("no path"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Sources**: [`NeighborSource`] trait with shared pagination drain; MediaWiki,
//!   in-memory CSR and retry implementations
//! - **Storage**: per-walk node arena with parent links, CSR link graph
//! - **Algorithms**: concurrent frontier engine, synchronous reference BFS

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod error;
pub mod path;
pub mod source;
pub mod storage;

// Re-export core types
pub use algorithms::{bfs, bfs_distance, walk, ExpandEvent, WalkConfig, WalkStats, Walker};
pub use error::{FetchError, Result, WalkError};
pub use path::Path;
pub use source::{NeighborSource, Neighbors, Resolution};
