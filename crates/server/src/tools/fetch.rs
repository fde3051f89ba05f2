//! worker_fetch tool implementation.
//!
//! Runs one fetch event through the worker. Requests the worker does not
//! claim go straight to the network and are never stored.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use roam_client::{FetchOutcome, Method, Request, RequestMode, Response, Worker};
use roam_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// URL to request. Relative URLs resolve against the site origin.
    pub url: String,

    /// HTTP method (default GET).
    #[serde(default)]
    pub method: Option<String>,

    /// Request mode: "navigate", "same-origin", "no-cors" (default) or "cors".
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Whether the worker handled the request itself.
    pub claimed: bool,
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
}

impl WorkerFetchOutput {
    fn new(claimed: bool, request: &Request, response: &Response) -> Self {
        Self {
            claimed,
            url: request.url.to_string(),
            status: response.status.as_u16(),
            content_type: response.content_type().map(str::to_string),
            body: response.text(),
        }
    }
}

fn parse_method(raw: Option<&str>) -> Result<Method, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Method::GET),
        Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {m:?}: {e}"))),
    }
}

pub async fn fetch_impl(worker: &Worker, params: WorkerFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let url = worker.resolve(&params.url)?;
    let method = parse_method(params.method.as_deref())?;
    let mode = params.mode.as_deref().map(str::parse::<RequestMode>).transpose()?.unwrap_or_default();
    let request = Request::get(url).with_method(method).with_mode(mode);

    let output = match worker.handle_fetch(&request).await? {
        FetchOutcome::Responded(response) => WorkerFetchOutput::new(true, &request, &response),
        FetchOutcome::PassThrough => {
            let response = worker.network().fetch(&request).await?;
            WorkerFetchOutput::new(false, &request, &response)
        }
    };

    tracing::debug!(claimed = output.claimed, status = output.status, "worker_fetch {}", output.url);
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::support::{active_worker, mock_site, output};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    fn params(url: &str) -> WorkerFetchParams {
        WorkerFetchParams { url: url.into(), ..Default::default() }
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method(None).unwrap(), Method::GET);
        assert_eq!(parse_method(Some(" post ")).unwrap(), Method::POST);
        assert!(parse_method(Some("NOT A METHOD")).is_err());
    }

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;
        assert!(fetch_impl(&worker, params("  ")).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_invalid_mode() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;
        let params = WorkerFetchParams { mode: Some("teleport".into()), ..params("/") };
        let err = fetch_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_fetch_json_data_falls_back_to_cache() {
        let server = mock_site().await;
        Mock::given(method("GET"))
            .and(path("/jsonassets/places.json"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[\"beach\"]", "application/json"))
            .mount(&server)
            .await;
        let worker = active_worker(&server).await;

        let fresh: WorkerFetchOutput = output(&fetch_impl(&worker, params("/jsonassets/places.json")).await.unwrap());
        assert!(fresh.claimed);
        assert_eq!(fresh.body, "[\"beach\"]");

        server.reset().await;
        let stale: WorkerFetchOutput = output(&fetch_impl(&worker, params("/jsonassets/places.json")).await.unwrap());
        assert_eq!(stale.status, 200);
        assert_eq!(stale.body, "[\"beach\"]");

        let empty: WorkerFetchOutput = output(&fetch_impl(&worker, params("/jsonassets/events.json")).await.unwrap());
        assert_eq!(empty.body, "[]");
    }

    #[tokio::test]
    async fn test_fetch_shell_navigation() {
        let server = mock_site().await;
        let worker = active_worker(&server).await;

        let params = WorkerFetchParams { mode: Some("navigate".into()), ..params("/") };
        let result: WorkerFetchOutput = output(&fetch_impl(&worker, params).await.unwrap());
        assert!(result.claimed);
        assert_eq!(result.body, "<html>roam</html>");
    }

    #[tokio::test]
    async fn test_fetch_pass_through_is_not_stored() {
        let server = mock_site().await;
        Mock::given(method("GET"))
            .and(path("/titlelogo.webp"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("png", "image/webp"))
            .mount(&server)
            .await;
        let worker = active_worker(&server).await;

        let result: WorkerFetchOutput = output(&fetch_impl(&worker, params("/titlelogo.webp")).await.unwrap());
        assert!(!result.claimed);
        assert_eq!(result.content_type.as_deref(), Some("image/webp"));

        for region in worker.store().list_regions().await.unwrap() {
            let stored = worker.store().match_snapshot(&region.name, "GET", &result.url).await.unwrap();
            assert!(stored.is_none());
        }
    }
}
