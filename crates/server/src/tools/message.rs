//! worker_message tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use roam_client::{ControlMessage, WarmReport, Worker};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageParams {
    /// Message action, e.g. "cacheData".
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerMessageOutput {
    pub action: String,
    /// False when the worker ignored the message.
    pub recognized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<WarmReport>,
}

pub async fn message_impl(worker: &Worker, params: WorkerMessageParams) -> Result<CallToolResult, McpError> {
    let message = ControlMessage::from_value(&json!({ "action": params.action }));
    let report = worker.handle_message(message).await;

    json_result(&WorkerMessageOutput { action: params.action, recognized: report.is_some(), report })
}
