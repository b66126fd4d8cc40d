//! Single-page retrieval.
//!
//! `PageSource` is the seam between the batch orchestrator and the network:
//! production code uses `HttpPageSource`, tests plug in in-memory sources.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::error::FetchError;

/// Something that can return one raw JSON page of a paginated collection.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch zero-based page `page` with `size` items per page.
    async fn fetch_page(&self, page: u32, size: u32) -> Result<Value, FetchError>;
}

/// Request configuration for one paginated endpoint.
#[derive(Clone, Debug, Default)]
pub struct EndpointConfig {
    /// Full URL of the collection, e.g. "http://localhost:8080/api/songs".
    pub url: String,
    /// Extra headers, merged over the default `Content-Type`.
    pub headers: BTreeMap<String, String>,
    /// Static query parameters sent with every page request.
    pub query_params: BTreeMap<String, String>,
    /// Bearer token for the `Authorization` header.
    pub auth_token: Option<String>,
}

/// `PageSource` that issues `GET <url>?page=N&size=M&...` requests.
#[derive(Clone)]
pub struct HttpPageSource {
    client: Client,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
}

impl HttpPageSource {
    /// Create a page source with its own HTTP client.
    ///
    /// No timeout is set unless `timeout` is given.
    pub fn new(config: &EndpointConfig, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Self::with_client(client, config)
    }

    /// Create a page source sharing an existing HTTP client.
    pub fn with_client(client: Client, config: &EndpointConfig) -> Result<Self, FetchError> {
        let headers = build_headers(&config.headers, config.auth_token.as_deref())?;
        let query = config
            .query_params
            .iter()
            .filter(|(k, _)| k.as_str() != "page" && k.as_str() != "size")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            client,
            url: config.url.trim_end_matches('/').to_string(),
            headers,
            query,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u32, size: u32) -> Result<Value, FetchError> {
        debug!("GET {} page={} size={}", self.url, page, size);

        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .query(&[("page", page), ("size", size)])
            .query(&self.query)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Reads a JSON body, turning non-success statuses into `FetchError::Http`.
pub(crate) async fn read_json(response: reqwest::Response) -> Result<Value, FetchError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(FetchError::Http {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Default `Content-Type: application/json`, caller headers on top, then the
/// bearer token unless the caller already set `Authorization`.
pub(crate) fn build_headers(
    extra: &BTreeMap<String, String>,
    auth_token: Option<&str>,
) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| FetchError::InvalidConfig(format!("header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidConfig(format!("header {}: {}", name, e)))?;
        headers.insert(name, value);
    }

    if let Some(token) = auth_token {
        if !headers.contains_key(AUTHORIZATION) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| FetchError::InvalidConfig(format!("auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
    }

    Ok(headers)
}
