//! Catalog clients pointed at a `MockApi`

use catalog_page_fetcher::{CatalogClient, ClientConfig, FetchSettings};
use std::collections::BTreeMap;

/// Client with the given page size and concurrency limit.
pub fn client_for(base_url: &str, page_size: u32, max_concurrent_requests: usize) -> CatalogClient {
    CatalogClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        settings: FetchSettings {
            page_size,
            max_concurrent_requests,
        },
        ..Default::default()
    })
    .expect("Failed to build catalog client")
}

/// Client with default settings, a bearer token and static query parameters.
pub fn authenticated_client(
    base_url: &str,
    token: &str,
    query_params: &[(&str, &str)],
) -> CatalogClient {
    let query_params: BTreeMap<String, String> = query_params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    CatalogClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        auth_token: Some(token.to_string()),
        query_params,
        ..Default::default()
    })
    .expect("Failed to build catalog client")
}
