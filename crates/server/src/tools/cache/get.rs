//! cache_get tool implementation.
//!
//! Retrieves the snapshot a region holds for a GET of the given URL.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use roam_client::Worker;
use roam_core::{Error, Snapshot};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Region name, e.g. "roam-ang-data-v1".
    pub region: String,
    /// Request URL. Relative URLs resolve against the site origin.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub region: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub stored_at: String,
}

impl CacheGetOutput {
    fn new(region: String, snapshot: Snapshot) -> Self {
        Self {
            region,
            body: String::from_utf8_lossy(&snapshot.body).into_owned(),
            url: snapshot.url,
            status: snapshot.status,
            headers: snapshot.headers,
            stored_at: snapshot.stored_at,
        }
    }
}

pub async fn get_impl(worker: &Worker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.region.trim().is_empty() {
        return Err(Error::InvalidInput("region cannot be empty".into()).into());
    }

    let url = worker.resolve(&params.url)?;
    let snapshot = worker
        .store()
        .match_snapshot(&params.region, "GET", url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} in {}", url, params.region)))?;

    json_result(&CacheGetOutput::new(params.region, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::support::{active_worker, mock_site, output};

    #[tokio::test]
    async fn test_get_missing() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;

        let params = CacheGetParams { region: "roam-ang-data-v1".into(), url: "/jsonassets/places.json".into() };
        let err = get_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }

    #[tokio::test]
    async fn test_get_precached_shell() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;

        let params = CacheGetParams { region: "roam-ang-cache-v1".into(), url: "/manifest.json".into() };
        let result: CacheGetOutput = output(&get_impl(&worker, params).await.unwrap());
        assert_eq!(result.status, 200);
        assert_eq!(result.body, r#"{"name":"Roam"}"#);
        assert!(result.url.ends_with("/manifest.json"));
    }

    #[tokio::test]
    async fn test_get_empty_region() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;

        let params = CacheGetParams { region: " ".into(), url: "/".into() };
        assert!(get_impl(&worker, params).await.is_err());
    }
}
