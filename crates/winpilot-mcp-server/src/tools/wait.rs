//! Wait tool implementation

use super::ToolResult;
use crate::errors::ToolError;
use crate::requests::WaitRequest;
use serde_json::json;
use std::time::Duration;

/// Suspend for the requested duration.
///
/// The whole connection waits with it: the next request line is not read until
/// this returns.
pub async fn run(request: WaitRequest) -> Result<ToolResult, ToolError> {
    tokio::time::sleep(Duration::from_millis(request.ms)).await;
    Ok(ToolResult::text(
        format!("wait ok: {}ms", request.ms),
        json!({"ms": request.ms}),
    ))
}
