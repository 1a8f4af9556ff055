//! Loading a server's full metadata: `/catalog` plus one `/info` per dataset

use crate::cache::ResponseCache;
use crate::client::HapiClient;
use crate::config::{ComparisonContext, ServerSpec};
use crate::error::{CompareError, CompareResult};
use crate::filter::IdFilter;
use hapi_core::{DatasetRecord, Info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    catalog: Vec<DatasetRecord>,
}

/// Path of the whole-catalog snapshot of one server
pub fn snapshot_path(data_dir: &Path, label: &str) -> PathBuf {
    data_dir
        .join("cache")
        .join(format!("catalog-all.{}.json", label))
}

/// Load the dataset records of one server
///
/// Without an id pattern the full catalog is written to a snapshot file. A
/// server with no cache expiry reuses that snapshot instead of fetching.
pub async fn load_catalog(
    client: &HapiClient,
    server: &ServerSpec,
    ctx: &ComparisonContext,
) -> CompareResult<Vec<DatasetRecord>> {
    let snapshot = snapshot_path(ctx.data_dir(), &server.label);
    let full_catalog = !ctx.filter().has_pattern();

    if full_catalog && server.expire_after.is_none() && snapshot.exists() {
        info!("Reading: {}", snapshot.display());
        return read_records(&snapshot).await;
    }

    let expire_after = match &server.expire_after {
        Some(spec) => spec.to_std(&format!("{}_expire_after", server.label))?,
        None => Duration::ZERO,
    };
    let records =
        fetch_all_metadata(client, server, ctx.data_dir(), ctx.filter(), expire_after).await?;

    if full_catalog {
        write_records(&snapshot, &records).await?;
        info!("Wrote: {}", snapshot.display());
    }

    Ok(records)
}

/// Fetch the catalog and the info of every non-omitted dataset
///
/// A failed `/info` request leaves that record without info; the normalizer
/// reports it. A failed `/catalog` request aborts.
pub async fn fetch_all_metadata(
    client: &HapiClient,
    server: &ServerSpec,
    data_dir: &Path,
    filter: &IdFilter,
    expire_after: Duration,
) -> CompareResult<Vec<DatasetRecord>> {
    if server.is_local() {
        info!("Reading: {}", server.url);
        let records = read_records(Path::new(&server.url)).await?;
        info!("Read: {}", server.url);
        return Ok(records);
    }

    let cache = ResponseCache::for_server(data_dir, &server.url, expire_after).await?;
    info!("Getting catalog and info metadata from {}", server.label);

    let catalog_url = format!("{}/catalog", server.url);
    let response = client.get_cached(&catalog_url, &cache).await?;
    if response.status != 200 {
        return Err(CompareError::Status {
            url: catalog_url,
            status: response.status,
        });
    }
    let mut datasets = serde_json::from_str::<CatalogResponse>(&response.body)
        .map_err(|e| CompareError::Json {
            origin: catalog_url.clone(),
            source: e,
        })?
        .catalog;

    for dataset in datasets.iter_mut() {
        if filter.should_omit(&dataset.id) {
            continue;
        }
        dataset.info = fetch_info(client, server, &cache, &dataset.id).await;
    }

    Ok(datasets)
}

async fn fetch_info(
    client: &HapiClient,
    server: &ServerSpec,
    cache: &ResponseCache,
    id: &str,
) -> Option<Info> {
    let url = format!("{}/info?id={}", server.url, id);

    let start = Instant::now();
    info!("  Getting {}: {}", server.label, url);
    let response = match client.get_cached(&url, cache).await {
        Ok(response) => response,
        Err(e) => {
            warn!("  {}", e);
            return None;
        }
    };

    if response.from_cache {
        info!("  Got: (from cache) {}", url);
        if let Some(file) = &response.cache_file {
            debug!("  Cache file: {}", file.display());
        }
    } else {
        info!(
            "  Got: (time = {:.6} [s]) {}",
            start.elapsed().as_secs_f64(),
            url
        );
    }

    if response.status != 200 {
        warn!("  {} returned HTTP status {}", url, response.status);
        return None;
    }

    match serde_json::from_str::<Info>(&response.body) {
        Ok(mut info) => {
            info.strip_envelope();
            Some(info)
        }
        Err(e) => {
            warn!("  Invalid info JSON from {}: {}", url, e);
            None
        }
    }
}

async fn read_records(path: &Path) -> CompareResult<Vec<DatasetRecord>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| CompareError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    serde_json::from_str(&content).map_err(|e| CompareError::Json {
        origin: path.display().to_string(),
        source: e,
    })
}

async fn write_records(path: &Path, records: &[DatasetRecord]) -> CompareResult<()> {
    let io_err = |e: std::io::Error| CompareError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }
    let content = serde_json::to_string(records).map_err(|e| CompareError::Json {
        origin: path.display().to_string(),
        source: e,
    })?;
    fs::write(path, content).await.map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn records() -> Vec<DatasetRecord> {
        serde_json::from_value(json!([
            {"id": "AC_H0_MFI", "info": {"startDate": "2001-01-01Z", "parameters": [{"name": "Time"}]}},
            {"id": "NO_INFO"}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_local_catalog_dump() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all-bw.json");
        write_records(&path, &records()).await.unwrap();

        let server = ServerSpec::new("bw", path.display().to_string());
        let client = HapiClient::new().unwrap();
        let loaded = fetch_all_metadata(
            &client,
            &server,
            dir.path(),
            &IdFilter::default(),
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(loaded, records());
    }

    #[tokio::test]
    async fn test_snapshot_reused_without_expiry() {
        let dir = TempDir::new().unwrap();
        write_records(&snapshot_path(dir.path(), "nl"), &records())
            .await
            .unwrap();

        // The URL is never contacted because the snapshot exists
        let server = ServerSpec::new("nl", "http://127.0.0.1:9/hapi");
        let ctx = ComparisonContext::new(server.clone(), ServerSpec::new("jf", "http://b"))
            .with_data_dir(dir.path());
        let client = HapiClient::new().unwrap();

        let loaded = load_catalog(&client, &server, &ctx).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded[1].info.is_none());
    }

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("/data"), "nl"),
            Path::new("/data/cache/catalog-all.nl.json")
        );
    }

    #[tokio::test]
    async fn test_missing_dump_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = read_records(&dir.path().join("absent.json")).await;
        assert!(matches!(result, Err(CompareError::Io { .. })));
    }
}
