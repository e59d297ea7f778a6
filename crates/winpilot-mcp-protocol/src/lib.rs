//! Common protocol definitions for winpilot-mcp
//!
//! This crate defines the JSON-RPC 2.0 envelope exchanged with an MCP client
//! and the newline-delimited framing used on stdio. Error payloads are the
//! `rmcp` model types.

use rmcp::model::{ErrorCode, ErrorData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// JSON-RPC version string carried by every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Application error code for a tool that was dispatched but failed
pub const TOOL_EXECUTION_ERROR: ErrorCode = ErrorCode(-32000);

/// Byte order mark some clients put in front of the first line
const BOM: char = '\u{feff}';

/// Request identifier, echoed back verbatim in the response.
///
/// Any JSON number is kept as-is (including fractions and values beyond
/// `i64`), so every request with an id can be answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(serde_json::Number),
    String(String),
}

impl From<i64> for RequestId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A method call that expects exactly one response
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub method: String,
    pub params: Option<Value>,
}

/// A method call without an id; never answered
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Option<Value>,
}

/// Error for a method this server does not implement
pub fn method_not_found(method: &str) -> ErrorData {
    ErrorData::new(
        ErrorCode::METHOD_NOT_FOUND,
        format!("Method not found: {}", method),
        None,
    )
}

/// Result or error half of a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(ErrorData),
}

/// A response to a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: RequestId, error: ErrorData) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: Outcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

/// Any message that can arrive on the input stream
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Notification(Notification),
    Response(Response),
}

/// Loose shape of an incoming line before it is classified
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    // Only meaningful on responses; requests with a stray `error` still count
    #[serde(default)]
    error: Option<Value>,
}

impl Message {
    /// Classify a decoded JSON value.
    ///
    /// Returns `None` for anything that is not a message-shaped object: non-objects,
    /// objects with a non-string `method`, ids that are neither numbers nor strings,
    /// and objects with neither a method nor a result/error.
    pub fn from_value(value: Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let raw: RawMessage = serde_json::from_value(value).ok()?;

        match (raw.method, raw.id) {
            (Some(method), Some(id)) => Some(Self::Request(Request {
                id,
                method,
                params: raw.params,
            })),
            (Some(method), None) => Some(Self::Notification(Notification {
                method,
                params: raw.params,
            })),
            (None, Some(id)) => {
                let outcome = match (raw.result, raw.error) {
                    (_, Some(error)) => Outcome::Error(serde_json::from_value(error).ok()?),
                    (Some(result), None) => Outcome::Result(result),
                    (None, None) => return None,
                };
                Some(Self::Response(Response {
                    jsonrpc: JSONRPC_VERSION.to_string(),
                    id,
                    outcome,
                }))
            }
            (None, None) => None,
        }
    }
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read one newline-terminated line into `buf`.
///
/// Returns `Ok(false)` once the stream is exhausted. A final line without a
/// trailing newline is still returned.
pub async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> Result<bool, ProtocolError> {
    buf.clear();
    let n = reader.read_until(b'\n', buf).await?;
    Ok(n > 0)
}

/// Decode a raw line into a message.
///
/// Invalid UTF-8 is replaced rather than rejected, a leading BOM and surrounding
/// whitespace are stripped. Blank lines and undecodable JSON yield `None`.
pub fn decode_line(bytes: &[u8]) -> Option<Message> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_start_matches(BOM).trim();
    if line.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(line).ok()?;
    Message::from_value(value)
}

/// Serialize a response as one compact line and flush it
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), ProtocolError> {
    let mut data = serde_json::to_vec(response)?;
    data.push(b'\n');
    writer.write_all(&data).await?;
    writer.flush().await?;
    Ok(())
}
