//! Request handling for the roam offline worker.
//!
//! This crate provides request classification, the network boundary, the
//! per-class caching strategies, sitemap synthesis, and the [`Worker`] that
//! ties them to a lifecycle.

pub mod classify;
pub mod fetch;
pub mod request;
pub mod sitemap;
pub mod strategy;
pub mod tasks;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{Classifier, ResourceClass, Strategy};
pub use fetch::{FetchClient, FetchConfig, Network};
pub use reqwest::Method;
pub use request::{CacheMode, Request, RequestMode, Response};
pub use sitemap::SitemapSynthesizer;
pub use worker::{
    ActivateReport, ControlMessage, FetchOutcome, InstallReport, LifecycleState, WarmReport, Worker,
};
