//! Neighbor sources: where outgoing links come from
//!
//! The walk engine only sees [`NeighborSource`]. Implementations provide a single
//! page-level request ([`NeighborSource::fetch_page`]); pagination draining,
//! de-duplication and eligibility checks are shared provided methods so every
//! source assembles edge lists the same way.
//!
//! - [`memory::MemoryGraph`]: CSR-backed in-memory graph (tests, demos, benches)
//! - `mediawiki::MediaWikiSource`: MediaWiki `prop=links` API (feature `mediawiki`)
//! - [`retry::Retrying`]: retry and deadline decorator around any source

use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "mediawiki")]
pub mod mediawiki;
pub mod memory;
pub mod retry;

#[cfg(feature = "mediawiki")]
pub use mediawiki::{MediaWikiConfig, MediaWikiSource};
pub use memory::MemoryGraph;
pub use retry::{RetryPolicy, Retrying};

/// What a source knows about a title from its first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// Traversable content page
    Content,
    /// Exists, but outside the eligible node space
    Ineligible,
    /// Does not exist
    Missing,
}

/// Opaque continuation parameters returned by a paginated source.
///
/// Echoed back verbatim on the next request for the same title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Continuation(BTreeMap<String, String>);

impl Continuation {
    /// Empty continuation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one parameter
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up one parameter
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// All parameters, sorted by key
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether no parameters are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Continuation {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One page of a title's outgoing links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPage {
    /// Canonical title as reported by the source
    pub title: String,
    /// Existence and eligibility
    pub status: PageStatus,
    /// Links on this page
    pub links: Vec<String>,
    /// Parameters for the next page, `None` on the last page
    pub next: Option<Continuation>,
}

/// Result of [`NeighborSource::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Canonical title
    pub title: String,
    /// Whether the title may be traversed
    pub eligible: bool,
}

/// Complete, de-duplicated outgoing links of an eligible title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbors {
    /// Canonical title
    pub title: String,
    /// Links in first-seen order
    pub links: Vec<String>,
}

/// Source of outgoing links for titles.
///
/// Implementations must be callable concurrently: every call is independent and
/// carries its own request state.
#[async_trait]
pub trait NeighborSource: Send + Sync {
    /// Fetch one page of links for `title`.
    ///
    /// `continuation` is `None` for the first page and otherwise the `next` value
    /// of the previous page.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transient`] on any I/O or protocol fault. Missing and
    /// ineligible titles are reported through [`LinkPage::status`], not as errors.
    async fn fetch_page(
        &self,
        title: &str,
        continuation: Option<&Continuation>,
    ) -> Result<LinkPage, FetchError>;

    /// Resolve a title's canonical form and eligibility from its first page.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`] if the title does not exist, or whatever
    /// [`NeighborSource::fetch_page`] reports.
    async fn resolve(&self, title: &str) -> Result<Resolution, FetchError> {
        let page = self.fetch_page(title, None).await?;
        match page.status {
            PageStatus::Missing => Err(FetchError::NotFound(title.to_string())),
            status => Ok(Resolution {
                title: page.title,
                eligible: status == PageStatus::Content,
            }),
        }
    }

    /// All outgoing links of `title`, pagination fully drained.
    ///
    /// Does not check eligibility.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`] if the title does not exist, or any page failure.
    async fn edges(&self, title: &str) -> Result<Vec<String>, FetchError> {
        let first = self.fetch_page(title, None).await?;
        if first.status == PageStatus::Missing {
            return Err(FetchError::NotFound(title.to_string()));
        }
        Ok(drain(self, title, first).await?.links)
    }

    /// Resolve `title` and, if it is an eligible content page, drain its links.
    ///
    /// This is the one call the walk engine needs per node.
    ///
    /// # Errors
    ///
    /// [`FetchError::NotFound`], [`FetchError::Ineligible`], or any page failure.
    async fn fetch_neighbors(&self, title: &str) -> Result<Neighbors, FetchError> {
        let first = self.fetch_page(title, None).await?;
        match first.status {
            PageStatus::Missing => Err(FetchError::NotFound(title.to_string())),
            PageStatus::Ineligible => Err(FetchError::Ineligible(first.title)),
            PageStatus::Content => drain(self, title, first).await,
        }
    }
}

/// Follow continuations from `first` until the source stops returning one.
///
/// Links are concatenated page by page and de-duplicated keeping the first
/// occurrence, so the result does not depend on how the source splits pages.
async fn drain<S: NeighborSource + ?Sized>(
    source: &S,
    title: &str,
    first: LinkPage,
) -> Result<Neighbors, FetchError> {
    let mut seen = HashSet::new();
    let mut links = Vec::with_capacity(first.links.len());
    let mut absorb = |page_links: Vec<String>| {
        for link in page_links {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    };

    let canonical = first.title;
    absorb(first.links);

    // Every continuation issued during this drain; a repeat means the cursor cycles
    let mut issued = HashSet::new();
    let mut next = first.next;
    while let Some(continuation) = next {
        if !issued.insert(continuation.clone()) {
            return Err(FetchError::Transient(format!(
                "pagination for {title} did not advance"
            )));
        }
        let page = source.fetch_page(title, Some(&continuation)).await?;
        absorb(page.links);
        next = page.next;
    }

    Ok(Neighbors {
        title: canonical,
        links,
    })
}
