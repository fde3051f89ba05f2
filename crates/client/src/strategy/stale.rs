//! Stale-while-revalidate.
//!
//! The network fetch starts before the region lookup and runs as a background
//! task. A stored snapshot answers immediately; the fetch then only refreshes
//! the region. Without a snapshot the caller waits for the fetch itself.

use std::sync::Arc;

use roam_core::{CacheStore, Error};
use tokio::sync::oneshot;

use crate::fetch::Network;
use crate::request::{Request, Response};
use crate::tasks::BackgroundTasks;

pub async fn stale_while_revalidate(
    store: &CacheStore, network: Arc<dyn Network>, tasks: &BackgroundTasks, region: &str, request: &Request,
) -> Result<Response, Error> {
    let (tx, rx) = oneshot::channel();

    let revalidate = {
        let store = store.clone();
        let region = region.to_string();
        let request = request.clone();
        async move {
            let result = network.fetch(&request).await;
            let fresh = match &result {
                Ok(response) if response.is_ok() => Some(response.clone()),
                _ => None,
            };
            // The caller is gone when a snapshot already answered.
            let _ = tx.send(result);

            if let Some(response) = fresh {
                match store.put_snapshot(&region, &response.to_snapshot(&request)).await {
                    Ok(()) => tracing::debug!("revalidated {} in {}", request.url, region),
                    Err(e) => tracing::warn!("failed to store {} in {}: {}", request.url, region, e),
                }
            }
        }
    };
    tasks.spawn(revalidate).await;

    match store.match_snapshot(region, request.method.as_str(), request.url.as_str()).await {
        Ok(Some(snapshot)) => match Response::from_snapshot(&snapshot) {
            Ok(response) => {
                tracing::debug!("cache hit for {} in {}", request.url, region);
                return Ok(response);
            }
            Err(e) => tracing::warn!("ignoring stored {}: {}", request.url, e),
        },
        Ok(None) => tracing::debug!("cache miss for {} in {}", request.url, region),
        Err(e) => tracing::warn!("cache lookup failed for {}: {}", request.url, e),
    }

    rx.await
        .unwrap_or_else(|_| Err(Error::Network(format!("fetch for {} was cancelled", request.url))))
}
