//! On-disk read-through cache of HTTP responses
//!
//! Each server gets its own directory under
//! `{data_dir}/CachedSession/compare/{host}/{path}`. Entries are JSON files
//! named by the SHA-256 of the request URL:
//!
//! ```json
//! {
//!   "url": "https://host/hapi/info?id=AC_H0_MFI",
//!   "fetched_at": "2024-05-01T12:00:00Z",
//!   "status": 200,
//!   "body": "..."
//! }
//! ```

use crate::client::DataResponse;
use crate::error::{CompareError, CompareResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, warn};

/// Only successful responses are cached
const CACHEABLE_STATUS: u16 = 200;

/// A response and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
    pub from_cache: bool,
    /// Cache file the response was read from
    pub cache_file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    fetched_at: DateTime<Utc>,
    status: u16,
    body: String,
}

/// Response cache for one server
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    expire_after: Duration,
}

impl ResponseCache {
    /// Create a cache in an existing directory
    pub fn new(dir: impl Into<PathBuf>, expire_after: Duration) -> Self {
        Self {
            dir: dir.into(),
            expire_after,
        }
    }

    /// Create (and make the directory of) the cache for a server base URL
    pub async fn for_server(
        data_dir: &Path,
        server_url: &str,
        expire_after: Duration,
    ) -> CompareResult<Self> {
        let url = reqwest::Url::parse(server_url).map_err(|_| CompareError::InvalidUrl {
            url: server_url.to_string(),
        })?;

        let mut dir = data_dir
            .join("CachedSession")
            .join("compare")
            .join(url.host_str().unwrap_or("localhost"));
        if let Some(segments) = url.path_segments() {
            for segment in segments.filter(|s| !s.is_empty()) {
                dir.push(segment);
            }
        }

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CompareError::Io {
                path: dir.clone(),
                source: e,
            })?;

        Ok(Self::new(dir, expire_after))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key of a URL
    pub fn key(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(url)))
    }

    /// Load a fresh entry, or `None` when absent, expired, or unreadable
    pub async fn load(&self, url: &str) -> CompareResult<Option<CachedResponse>> {
        let path = self.entry_path(url);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CompareError::Io { path, source: e }),
        };

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache file {:?}: {}", path, e);
                return Ok(None);
            }
        };

        // A timestamp in the future counts as fresh
        let expired = (Utc::now() - entry.fetched_at)
            .to_std()
            .map(|age| age >= self.expire_after)
            .unwrap_or(false);
        if expired {
            debug!("Cache entry for {} expired", url);
            return Ok(None);
        }

        Ok(Some(CachedResponse {
            status: entry.status,
            body: entry.body,
            from_cache: true,
            cache_file: Some(path),
        }))
    }

    /// Store a response; anything but HTTP 200 is ignored
    pub async fn store(&self, url: &str, response: &DataResponse) -> CompareResult<()> {
        if response.status != CACHEABLE_STATUS {
            return Ok(());
        }

        let entry = CacheEntry {
            url: url.to_string(),
            fetched_at: Utc::now(),
            status: response.status,
            body: response.body.clone(),
        };
        let content = serde_json::to_string(&entry).map_err(|e| CompareError::Json {
            origin: url.to_string(),
            source: e,
        })?;

        let path = self.entry_path(url);
        fs::write(&path, content)
            .await
            .map_err(|e| CompareError::Io { path, source: e })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ok(body: &str) -> DataResponse {
        DataResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let url = "https://host/hapi/info?id=A";

        assert!(cache.load(url).await.unwrap().is_none());
        cache.store(url, &ok("{}")).await.unwrap();

        let hit = cache.load(url).await.unwrap().unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.body, "{}");
        assert_eq!(hit.cache_file, Some(cache.entry_path(url)));
    }

    #[tokio::test]
    async fn test_error_status_not_cached() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let url = "https://host/hapi/info?id=MISSING";

        let response = DataResponse {
            status: 404,
            body: "not found".to_string(),
        };
        cache.store(url, &response).await.unwrap();
        assert!(cache.load(url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_expiry_never_hits() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::ZERO);
        let url = "https://host/hapi/catalog";

        cache.store(url, &ok("[]")).await.unwrap();
        assert!(cache.load(url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::new(dir.path(), Duration::from_secs(3600));
        let url = "https://host/hapi/catalog";

        std::fs::write(cache.entry_path(url), "not json").unwrap();
        assert!(cache.load(url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_directory_layout() {
        let dir = TempDir::new().unwrap();
        let cache = ResponseCache::for_server(
            dir.path(),
            "https://cdaweb.gsfc.nasa.gov/hapi",
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(
            cache.dir(),
            dir.path()
                .join("CachedSession")
                .join("compare")
                .join("cdaweb.gsfc.nasa.gov")
                .join("hapi")
        );
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn test_key_is_stable_hex() {
        let key = ResponseCache::key("https://host/hapi/catalog");
        assert_eq!(key.len(), 64);
        assert_eq!(key, ResponseCache::key("https://host/hapi/catalog"));
        assert_ne!(key, ResponseCache::key("https://host/hapi/info"));
    }
}
