//! The offline resource cache manager.
//!
//! A [`Worker`] owns everything a running instance needs: the cache store
//! handle, the network, routing tables, lifecycle state and the set of
//! background cache writes still in flight. Hosts drive it through four
//! entry points: [`Worker::install`], [`Worker::activate`],
//! [`Worker::handle_fetch`] and [`Worker::handle_message`].

pub mod lifecycle;
pub mod message;

use std::sync::Arc;

use futures_util::future::join_all;
use roam_core::{CacheStore, Error, WorkerConfig};
use tokio::sync::RwLock;
use url::Url;

pub use lifecycle::{ActivateReport, InstallReport, LifecycleState, WarmReport};
pub use message::ControlMessage;

use crate::classify::{Classifier, Strategy};
use crate::fetch::{Network, resolve};
use crate::request::{CacheMode, Request, Response};
use crate::sitemap::SitemapSynthesizer;
use crate::strategy::{network_first, stale_while_revalidate};
use crate::tasks::BackgroundTasks;

/// Result of dispatching one fetch event.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The worker claimed the event and produced this response.
    Responded(Response),
    /// Not claimed; the host's default network handling applies.
    PassThrough,
}

pub struct Worker {
    config: WorkerConfig,
    origin: Url,
    shell_region: String,
    data_region: String,
    store: CacheStore,
    network: Arc<dyn Network>,
    classifier: Classifier,
    sitemap: SitemapSynthesizer,
    state: RwLock<LifecycleState>,
    tasks: BackgroundTasks,
}

impl Worker {
    pub fn new(config: WorkerConfig, store: CacheStore, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidInput(e.to_string()))?;
        let sitemap = SitemapSynthesizer::new(&config, &origin)?;
        Ok(Self {
            shell_region: config.shell_region(),
            data_region: config.data_region(),
            classifier: Classifier::from_config(&config),
            sitemap,
            origin,
            config,
            store,
            network,
            state: RwLock::new(LifecycleState::Uninstalled),
            tasks: BackgroundTasks::new(),
        })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// The network the worker fetches through; hosts use it for pass-through.
    pub fn network(&self) -> &dyn Network {
        self.network.as_ref()
    }

    pub fn shell_region(&self) -> &str {
        &self.shell_region
    }

    pub fn data_region(&self) -> &str {
        &self.data_region
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    /// Resolve a URL as seen from a page on the site origin.
    pub fn resolve(&self, raw: &str) -> Result<Url, Error> {
        resolve(&self.origin, raw).map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    async fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState { expected: from.to_string(), actual: state.to_string() });
        }
        *state = to;
        Ok(())
    }

    /// Install: pre-populate the shell region.
    ///
    /// Pre-population is all-or-nothing and its failure never fails the
    /// install. Errors only when called twice.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(LifecycleState::Uninstalled, LifecycleState::Installing).await?;
        tracing::info!("installing worker into {}", self.shell_region);

        let precached = match self.precache_shell().await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("shell pre-population failed, continuing install: {}", e);
                0
            }
        };

        self.transition(LifecycleState::Installing, LifecycleState::Installed).await?;
        Ok(InstallReport { precached, skip_waiting: true })
    }

    async fn precache_shell(&self) -> Result<usize, Error> {
        self.store.open_region(&self.shell_region).await?;

        let requests = self
            .config
            .shell_urls
            .iter()
            .map(|raw| self.resolve(raw).map(Request::get))
            .collect::<Result<Vec<_>, _>>()?;

        let results = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut snapshots = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(results) {
            let response = result?;
            if !response.is_ok() {
                return Err(Error::Network(format!("{} answered {}", request.url, response.status)));
            }
            snapshots.push(response.to_snapshot(request));
        }

        for snapshot in &snapshots {
            self.store.put_snapshot(&self.shell_region, snapshot).await?;
        }
        Ok(snapshots.len())
    }

    /// Activate: drop every region outside the allow-list, then claim clients.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(LifecycleState::Installed, LifecycleState::Activating).await?;

        let allowed = [&self.shell_region, &self.data_region];
        let mut deleted = Vec::new();
        match self.store.region_names().await {
            Ok(names) => {
                for name in names.into_iter().filter(|name| !allowed.contains(&name)) {
                    match self.store.delete_region(&name).await {
                        Ok(_) => {
                            tracing::info!("deleted stale region {}", name);
                            deleted.push(name);
                        }
                        Err(e) => tracing::warn!("failed to delete region {}: {}", name, e),
                    }
                }
            }
            Err(e) => tracing::warn!("could not enumerate regions: {}", e),
        }

        self.transition(LifecycleState::Activating, LifecycleState::Active).await?;
        tracing::info!("worker active, controlling clients");
        Ok(ActivateReport { deleted, clients_claimed: true })
    }

    /// Dispatch one intercepted request.
    ///
    /// `Err` only when a shell request has neither a stored snapshot nor a
    /// network response.
    pub async fn handle_fetch(&self, request: &Request) -> Result<FetchOutcome, Error> {
        let state = self.state().await;
        if !state.can_intercept_fetch() {
            tracing::debug!("worker {}, not intercepting {}", state, request.url);
            return Ok(FetchOutcome::PassThrough);
        }

        let class = self.classifier.classify(request);
        let Some(strategy) = class.strategy() else {
            return Ok(FetchOutcome::PassThrough);
        };
        tracing::debug!("{} {} routed as {}", request.method, request.url, class);

        let response = match strategy {
            Strategy::StaleWhileRevalidate => {
                stale_while_revalidate(&self.store, Arc::clone(&self.network), &self.tasks, &self.shell_region, request)
                    .await?
            }
            Strategy::NetworkFirst => network_first(&self.store, self.network.as_ref(), &self.data_region, request).await,
            Strategy::SynthesizeSitemap => {
                self.sitemap.respond(self.network.as_ref(), chrono::Utc::now().date_naive()).await
            }
        };

        Ok(FetchOutcome::Responded(response))
    }

    /// Handle a control message. Returns a report for recognized actions.
    pub async fn handle_message(&self, message: ControlMessage) -> Option<WarmReport> {
        match message {
            ControlMessage::CacheData => Some(self.warm_data().await),
            ControlMessage::Unknown => {
                tracing::debug!("ignoring unrecognized control message");
                None
            }
        }
    }

    async fn warm_data(&self) -> WarmReport {
        let outcomes = join_all(self.config.warm_urls.iter().map(|raw| self.warm_one(raw))).await;

        let mut report = WarmReport::default();
        for (raw, stored) in self.config.warm_urls.iter().zip(outcomes) {
            if stored {
                report.stored.push(raw.clone());
            } else {
                report.failed.push(raw.clone());
            }
        }
        tracing::info!("warmed {}: {} stored, {} failed", self.data_region, report.stored.len(), report.failed.len());
        report
    }

    async fn warm_one(&self, raw: &str) -> bool {
        let request = match self.resolve(raw) {
            Ok(url) => Request::get(url).with_cache(CacheMode::NoStore),
            Err(e) => {
                tracing::warn!("skipping warm URL {}: {}", raw, e);
                return false;
            }
        };

        match self.network.fetch(&request).await {
            Ok(response) if response.is_ok() => {
                match self.store.put_snapshot(&self.data_region, &response.to_snapshot(&request)).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("failed to store {}: {}", request.url, e);
                        false
                    }
                }
            }
            Ok(response) => {
                tracing::debug!("{} answered {}, not stored", request.url, response.status);
                false
            }
            Err(e) => {
                tracing::debug!("{} unreachable: {}", request.url, e);
                false
            }
        }
    }

    /// Wait for every background cache write to finish.
    pub async fn settle(&self) {
        self.tasks.settle().await;
    }

    /// Stop intercepting and drain background writes.
    pub async fn retire(&self) {
        *self.state.write().await = LifecycleState::Redundant;
        self.tasks.settle().await;
        tracing::info!("worker retired");
    }
}
