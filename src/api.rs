//! Content API client.
//!
//! The site's pages and search index live behind a REST API that this crate
//! consumes but does not implement. Two endpoints matter:
//!
//! ```text
//! GET {base}/page/navigation?basePath=<path>  →  { "data": PageNode[] }
//! GET {base}/search/global?query=<text>       →  { "data": ResultItem[] }
//!                                              | { "data": { "<category>": ResultItem[], ... } }
//! ```
//!
//! The search response shape varies, so it is decoded once, right here, into
//! the [`SearchData`] tagged union and flattened by
//! [`SearchData::into_items`]. Nothing downstream inspects raw JSON.
//!
//! [`ContentApi`] is the seam used by the hierarchy loader and the search
//! controller; tests substitute in-memory implementations.

use crate::config::ApiConfig;
use crate::types::{PageNode, ResultItem};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("cannot decode API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Standard `{ "data": ... }` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Search payload: either a flat list or results grouped by category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SearchData {
    Flat(Vec<ResultItem>),
    Grouped(BTreeMap<String, CategoryValue>),
}

/// A value under a category key. Non-list values (counts, metadata) are
/// carried but never rendered.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Items(Vec<ResultItem>),
    Other(serde_json::Value),
}

impl SearchData {
    /// Flatten to a single list. Grouped categories are concatenated in key
    /// order.
    pub fn into_items(self) -> Vec<ResultItem> {
        match self {
            SearchData::Flat(items) => items,
            SearchData::Grouped(groups) => groups
                .into_values()
                .filter_map(|value| match value {
                    CategoryValue::Items(items) => Some(items),
                    CategoryValue::Other(_) => None,
                })
                .flatten()
                .collect(),
        }
    }
}

/// Decode a raw search response body into a flat result list.
pub fn decode_search_response(body: &str) -> Result<Vec<ResultItem>, ApiError> {
    let envelope: Envelope<SearchData> = serde_json::from_str(body)?;
    Ok(envelope.data.into_items())
}

/// Read access to the content API.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Flat page list under `base_path`.
    async fn navigation(&self, base_path: &str) -> Result<Vec<PageNode>, ApiError>;

    /// Free-text search, already normalized to a flat list.
    async fn search(&self, query: &str) -> Result<Vec<ResultItem>, ApiError>;
}

/// reqwest-backed [`ContentApi`].
#[derive(Debug, Clone)]
pub struct HttpContentApi {
    client: Client,
    base_url: Url,
}

impl HttpContentApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("content-nav/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: directory_url(&config.base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    #[instrument(skip(self))]
    async fn navigation(&self, base_path: &str) -> Result<Vec<PageNode>, ApiError> {
        let url = self.endpoint("page/navigation", &[("basePath", base_path)])?;
        let envelope: Envelope<Vec<PageNode>> = self.get_json(url).await?;
        Ok(envelope.data)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<ResultItem>, ApiError> {
        let url = self.endpoint("search/global", &[("query", query)])?;
        let envelope: Envelope<SearchData> = self.get_json(url).await?;
        Ok(envelope.data.into_items())
    }
}

/// Parse a base URL so that relative joins append to its path.
fn directory_url(base: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
