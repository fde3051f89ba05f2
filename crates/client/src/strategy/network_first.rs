//! Network-first with offline fallback.
//!
//! Fresh data wins. When the network is unreachable or answers with a non-ok
//! status the last stored snapshot is served, and when there is none the
//! caller still gets a well-formed empty JSON array.

use roam_core::CacheStore;

use crate::fetch::Network;
use crate::request::{CacheMode, Request, Response};

pub async fn network_first(store: &CacheStore, network: &dyn Network, region: &str, request: &Request) -> Response {
    let request = request.clone().with_cache(CacheMode::NoStore);

    match network.fetch(&request).await {
        Ok(response) if response.is_ok() => {
            if let Err(e) = store.put_snapshot(region, &response.to_snapshot(&request)).await {
                tracing::warn!("failed to store {} in {}: {}", request.url, region, e);
            }
            return response;
        }
        Ok(response) => tracing::debug!("{} answered {}, falling back to {}", request.url, response.status, region),
        Err(e) => tracing::debug!("{} unreachable ({}), falling back to {}", request.url, e, region),
    }

    match store.match_snapshot(region, request.method.as_str(), request.url.as_str()).await {
        Ok(Some(snapshot)) => match Response::from_snapshot(&snapshot) {
            Ok(response) => return response,
            Err(e) => tracing::warn!("ignoring stored {}: {}", request.url, e),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!("cache lookup failed for {}: {}", request.url, e),
    }

    tracing::debug!("no stored copy of {}, serving empty array", request.url);
    Response::empty_json_array()
}
