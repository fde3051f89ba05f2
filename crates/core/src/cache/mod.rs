//! SQLite-backed store of named response cache regions.
//!
//! This module provides a durable cache using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Named regions created on first open and deleted wholesale
//! - Request identity keys (method + full URL) hashed with SHA-256
//! - Last-write-wins snapshot overwrite
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod regions;
pub mod snapshots;

pub use crate::Error;

pub use connection::CacheStore;
pub use regions::RegionInfo;
pub use snapshots::Snapshot;
