//! MediaWiki `prop=links` neighbor source.
//!
//! One page request per call:
//!
//! ```text
//! GET {endpoint}?action=query&format=json&prop=links&pllimit=max&titles=Rust
//!                [&continue=||&plcontinue=123|0|Foo]
//! ```
//!
//! The query is rebuilt from the immutable [`MediaWikiConfig`] for every request,
//! so concurrent fetches never share request state.

use super::{Continuation, LinkPage, NeighborSource, PageStatus};
use crate::error::FetchError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// English Wikipedia API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// MediaWiki source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaWikiConfig {
    /// `api.php` URL
    pub endpoint: String,
    /// Sent with every request (Wikimedia rejects anonymous clients)
    pub user_agent: String,
    /// `pllimit` value: links per page, or `max`
    pub page_limit: String,
    /// Namespace of traversable pages (0 = articles)
    pub eligible_namespace: i64,
    /// Per-request HTTP timeout
    pub request_timeout: Option<Duration>,
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("wikiwalk/", env!("CARGO_PKG_VERSION")).to_string(),
            page_limit: "max".to_string(),
            eligible_namespace: 0,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl MediaWikiConfig {
    /// Set the API endpoint
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set `pllimit`
    #[must_use]
    pub fn with_page_limit(mut self, page_limit: impl Into<String>) -> Self {
        self.page_limit = page_limit.into();
        self
    }

    /// Query parameters for one page request.
    fn query(&self, title: &str, continuation: Option<&Continuation>) -> Vec<(String, String)> {
        let mut params = vec![
            ("action".to_string(), "query".to_string()),
            ("format".to_string(), "json".to_string()),
            ("prop".to_string(), "links".to_string()),
            ("pllimit".to_string(), self.page_limit.clone()),
            ("titles".to_string(), title.to_string()),
        ];
        if let Some(continuation) = continuation {
            params.extend(
                continuation
                    .params()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            );
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
    #[serde(rename = "continue")]
    continuation: Option<HashMap<String, serde_json::Value>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    #[serde(default)]
    pages: HashMap<String, ApiPage>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    title: String,
    #[serde(default)]
    ns: i64,
    missing: Option<serde_json::Value>,
    invalid: Option<serde_json::Value>,
    #[serde(default)]
    links: Vec<ApiLink>,
}

#[derive(Debug, Deserialize)]
struct ApiLink {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

/// [`NeighborSource`] backed by a MediaWiki API.
#[derive(Debug, Clone)]
pub struct MediaWikiSource {
    config: MediaWikiConfig,
    client: reqwest::Client,
}

impl MediaWikiSource {
    /// Create a source for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transient`] if the HTTP client cannot be built
    /// (e.g. TLS backend initialization fails).
    pub fn new(config: MediaWikiConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &MediaWikiConfig {
        &self.config
    }

    fn to_link_page(&self, requested: &str, resp: ApiResponse) -> Result<LinkPage, FetchError> {
        if let Some(err) = resp.error {
            return Err(FetchError::Transient(format!(
                "API error {}: {}",
                err.code, err.info
            )));
        }

        // Single-title queries carry at most one page
        let page = resp
            .query
            .and_then(|q| q.pages.into_values().next());
        let Some(page) = page else {
            return Ok(LinkPage {
                title: requested.to_string(),
                status: PageStatus::Missing,
                links: Vec::new(),
                next: None,
            });
        };

        let status = if page.missing.is_some() || page.invalid.is_some() {
            PageStatus::Missing
        } else if page.ns == self.config.eligible_namespace {
            PageStatus::Content
        } else {
            PageStatus::Ineligible
        };

        let next = resp.continuation.map(|params| {
            params
                .into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (k, v)
                })
                .collect::<Continuation>()
        });

        Ok(LinkPage {
            title: page.title,
            status,
            links: page.links.into_iter().map(|l| l.title).collect(),
            next,
        })
    }
}

#[async_trait]
impl NeighborSource for MediaWikiSource {
    async fn fetch_page(
        &self,
        title: &str,
        continuation: Option<&Continuation>,
    ) -> Result<LinkPage, FetchError> {
        debug!(title, continued = continuation.is_some(), "fetching links page");

        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&self.config.query(title, continuation))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Transient(format!(
                "links query for {title} failed: {status} - {body}"
            )));
        }

        let body = resp.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&body)?;
        self.to_link_page(title, parsed)
    }
}
