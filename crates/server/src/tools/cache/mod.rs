//! Cache inspection MCP tools.

pub mod get;
pub mod regions;

pub use get::{CacheGetParams, get_impl};
pub use regions::regions_impl;
