//! MCP tool implementations.
//!
//! Each tool is a thin adapter: parse parameters, call the worker, render the
//! result as pretty JSON text content.

pub mod cache;
pub mod fetch;
pub mod message;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use roam_core::Error;
use serde::Serialize;

pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json =
        serde_json::to_string_pretty(output).map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
