//! HTTP client for HAPI servers

use crate::cache::{CachedResponse, ResponseCache};
use crate::config::ServerSpec;
use crate::error::{CompareError, CompareResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// A `/data` request for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQuery {
    pub id: String,
    /// Requested parameters; empty means all
    pub parameters: Vec<String>,
    pub time_min: String,
    pub time_max: String,
}

impl DataQuery {
    /// Path and query string, relative to a server's base URL
    pub fn path(&self) -> String {
        format!(
            "/data?id={}&parameters={}&time.min={}&time.max={}",
            self.id,
            self.parameters.join(","),
            self.time_min,
            self.time_max
        )
    }

    pub fn url(&self, server: &ServerSpec) -> String {
        format!("{}{}", server.url, self.path())
    }
}

/// Raw `/data` response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataResponse {
    pub status: u16,
    pub body: String,
}

/// Where data payloads come from
///
/// The data differ only needs this one call, so tests can substitute canned
/// payloads for real servers.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_data(&self, server: &ServerSpec, query: &DataQuery)
        -> CompareResult<DataResponse>;
}

/// Client for the `/catalog`, `/info` and `/data` endpoints
#[derive(Clone)]
pub struct HapiClient {
    client: Client,
}

impl HapiClient {
    pub fn new() -> CompareResult<Self> {
        // Servers under test frequently run with self-signed certificates
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(CompareError::ClientBuild)?;

        Ok(Self { client })
    }

    /// GET a URL and return status and body text
    pub async fn get(&self, url: &str) -> CompareResult<DataResponse> {
        let http_err = |e: reqwest::Error| CompareError::Http {
            url: url.to_string(),
            source: e,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(http_err)?;

        Ok(DataResponse { status, body })
    }

    /// GET through a response cache
    pub async fn get_cached(
        &self,
        url: &str,
        cache: &ResponseCache,
    ) -> CompareResult<CachedResponse> {
        if let Some(hit) = cache.load(url).await? {
            return Ok(hit);
        }

        let response = self.get(url).await?;
        cache.store(url, &response).await?;
        debug!("Fetched {} (status {})", url, response.status);

        Ok(CachedResponse {
            status: response.status,
            body: response.body,
            from_cache: false,
            cache_file: None,
        })
    }
}

#[async_trait]
impl DataSource for HapiClient {
    async fn fetch_data(
        &self,
        server: &ServerSpec,
        query: &DataQuery,
    ) -> CompareResult<DataResponse> {
        self.get(&query.url(server)).await
    }
}
