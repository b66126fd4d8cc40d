mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::ClientConfig;
use crate::fetcher::{FetchSettings, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_PAGE_SIZE};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub page_size: Option<u32>,
    pub max_concurrent_requests: Option<usize>,
    pub request_timeout_sec: Option<u64>,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub page_size: u32,
    pub max_concurrent_requests: usize,
    pub request_timeout_sec: Option<u64>,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("base_url must be specified via --base-url or in config file")
            })?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("base_url must be an http(s) URL: {}", base_url);
        }

        let auth_token = file.auth_token.or_else(|| cli.auth_token.clone());

        let page_size = file
            .page_size
            .or(cli.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            bail!("page_size must be greater than 0");
        }

        let max_concurrent_requests = file
            .max_concurrent_requests
            .or(cli.max_concurrent_requests)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS);
        if max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be greater than 0");
        }

        let request_timeout_sec = file.request_timeout_sec.or(cli.request_timeout_sec);

        let mut headers = cli.headers.clone();
        headers.extend(file.headers.unwrap_or_default());

        let mut query_params = cli.query_params.clone();
        query_params.extend(file.query_params.unwrap_or_default());

        Ok(Self {
            base_url,
            auth_token,
            page_size,
            max_concurrent_requests,
            request_timeout_sec,
            headers,
            query_params,
        })
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            page_size: self.page_size,
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            headers: self.headers.clone(),
            query_params: self.query_params.clone(),
            settings: self.fetch_settings(),
            timeout: self.request_timeout_sec.map(Duration::from_secs),
        }
    }
}

/// Parses a `KEY=VALUE` CLI argument.
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("expected KEY=VALUE, got {:?}", s),
    }
}
