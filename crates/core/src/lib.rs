//! Core types and shared functionality for the roam offline worker.
//!
//! This crate provides:
//! - Region-partitioned response cache with SQLite backend
//! - Unified error types
//! - Layered worker configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheStore, RegionInfo, Snapshot};
pub use config::{ConfigError, SectionEntry, SitemapDatePolicy, WorkerConfig};
pub use error::Error;
