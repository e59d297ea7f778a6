//! Error types for the MCP server
//!
//! Every tool failure ends up as a [`ToolError`], which knows which JSON-RPC
//! error code it maps to.

use crate::platform::PlatformError;
use std::path::PathBuf;
use thiserror::Error;
use rmcp::model::{ErrorCode, ErrorData};
use winpilot_mcp_protocol::TOOL_EXECUTION_ERROR;

/// Errors that can occur while validating or executing a tool call
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments have the wrong shape or are out of range
    #[error("{0}")]
    InvalidArguments(String),

    /// No tool with this name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// No visible window matched the filters
    #[error("target window not found")]
    TargetNotFound,

    /// The window vanished between lookup and a geometry query
    #[error("target window disappeared while reading its {0}")]
    WindowQuery(&'static str),

    /// The key name has no virtual-key mapping
    #[error("Unsupported key: {0}")]
    UnsupportedKey(String),

    /// A capability provider failed
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The captured image could not be encoded
    #[error("failed to encode capture: {0}")]
    Encode(#[from] image::ImageError),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// JSON-RPC error code for this failure
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArguments(_) => ErrorCode::INVALID_PARAMS,
            _ => TOOL_EXECUTION_ERROR,
        }
    }

    pub fn to_error_data(&self) -> ErrorData {
        ErrorData::new(self.code(), self.to_string(), None)
    }
}

/// Errors while loading the startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
