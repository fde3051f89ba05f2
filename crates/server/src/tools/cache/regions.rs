//! cache_regions tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use roam_client::Worker;
use roam_core::RegionInfo;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheRegionsOutput {
    pub regions: Vec<RegionInfo>,
    /// Regions this worker version keeps across activation.
    pub allowed: Vec<String>,
}

pub async fn regions_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let regions = worker.store().list_regions().await?;
    let allowed = worker.config().allowed_regions().to_vec();
    json_result(&CacheRegionsOutput { regions, allowed })
}
