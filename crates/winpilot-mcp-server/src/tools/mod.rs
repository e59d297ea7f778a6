//! MCP tool implementations
//!
//! [`ToolExecutor`] owns the desktop and the startup default window class and
//! dispatches a `tools/call` to one of the four tool modules.

pub mod capture;
pub mod click;
pub mod key;
pub mod wait;

use crate::errors::ToolError;
use crate::platform::Desktop;
use crate::requests::{self, CaptureRequest, ClickRequest, KeyRequest, WaitRequest};
use rmcp::model::{Content, Tool};
use rmcp::schemars::{self, JsonSchema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Result of a successful tool call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    pub is_error: bool,
    pub metadata: Value,
}

impl ToolResult {
    pub fn new(content: Vec<Content>, metadata: Value) -> Self {
        Self {
            content,
            is_error: false,
            metadata,
        }
    }

    /// Single text item
    pub fn text(text: impl Into<String>, metadata: Value) -> Self {
        Self::new(vec![Content::text(text.into())], metadata)
    }
}

/// Sleep between repetitions, skipping zero-length pauses
pub(crate) async fn pause(interval_ms: u64) {
    if interval_ms > 0 {
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
    }
}

/// Input schema for a request type, without the draft marker and title
fn input_schema<T: JsonSchema>() -> Arc<Map<String, Value>> {
    let schema = schemars::schema_for!(T);
    let mut object = match serde_json::to_value(&schema) {
        Ok(Value::Object(object)) => object,
        _ => Map::new(),
    };
    object.remove("$schema");
    object.remove("title");
    Arc::new(object)
}

/// The four tools with their input schemas, in a fixed order
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool::new(
            "capture",
            "Capture a screenshot (window client area by default). Returns an image for the LLM to see.",
            input_schema::<CaptureRequest>(),
        ),
        Tool::new(
            "click",
            "Click at normalized coordinates (x,y in [0..1]) relative to the target (window client area by default).",
            input_schema::<ClickRequest>(),
        ),
        Tool::new(
            "key",
            "Send a key to the target window (default postmessage).",
            input_schema::<KeyRequest>(),
        ),
        Tool::new(
            "wait",
            "Sleep for the specified duration.",
            input_schema::<WaitRequest>(),
        ),
    ]
}

/// Runs tool calls against a desktop
pub struct ToolExecutor<D> {
    desktop: D,
    default_hwnd_class: Option<String>,
}

impl<D: Desktop> ToolExecutor<D> {
    pub fn new(desktop: D, default_hwnd_class: Option<String>) -> Self {
        Self {
            desktop,
            default_hwnd_class: default_hwnd_class.filter(|c| !c.trim().is_empty()),
        }
    }

    #[cfg(test)]
    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    pub fn default_hwnd_class(&self) -> Option<&str> {
        self.default_hwnd_class.as_deref()
    }

    /// Validate `arguments` for the named tool and run it
    pub async fn call(&self, name: &str, arguments: Value) -> Result<ToolResult, ToolError> {
        let default_class = self.default_hwnd_class();
        match name {
            "capture" => capture::run(&self.desktop, requests::parse(arguments)?, default_class),
            "click" => click::run(&self.desktop, requests::parse(arguments)?, default_class).await,
            "key" => key::run(&self.desktop, requests::parse(arguments)?, default_class).await,
            "wait" => wait::run(requests::parse(arguments)?).await,
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}
