//! JSON-RPC method routing
//!
//! [`ProtocolEngine`] turns one decoded [`Message`] into at most one
//! [`Response`]. It holds no per-request state; the tool catalog and server
//! info are built once at startup.

use crate::platform::Desktop;
use crate::tools::{self, ToolExecutor};
use rmcp::model::{
    ErrorData, Implementation, InitializeResult, ListPromptsResult, ListResourcesResult,
    ListToolsResult, ProtocolVersion, ServerCapabilities, ToolsCapability,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use winpilot_mcp_protocol::{
    Message, Notification, Request, RequestId, Response, method_not_found,
};

/// Routes protocol methods to handlers and the tool executor
pub struct ProtocolEngine<D> {
    executor: ToolExecutor<D>,
    tool_list: ListToolsResult,
    server_info: Implementation,
}

impl<D: Desktop> ProtocolEngine<D> {
    pub fn new(executor: ToolExecutor<D>) -> Self {
        Self {
            executor,
            tool_list: ListToolsResult::with_all_items(tools::catalog()),
            // from_build_env() would report rmcp's own crate name
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
        }
    }

    #[cfg(test)]
    pub fn executor(&self) -> &ToolExecutor<D> {
        &self.executor
    }

    /// Handle one message; only requests produce a response
    pub async fn handle(&self, message: Message) -> Option<Response> {
        match message {
            Message::Request(request) => Some(self.handle_request(request).await),
            Message::Notification(notification) => {
                self.handle_notification(notification).await;
                None
            }
            Message::Response(response) => {
                tracing::debug!("Ignoring response from client for id {:?}", response.id);
                None
            }
        }
    }

    async fn handle_request(&self, request: Request) -> Response {
        let Request { id, method, params } = request;
        tracing::debug!("Handling request {:?}: {}", id, method);

        match method.as_str() {
            "initialize" => respond(id, &self.initialize(params.as_ref())),
            // Some clients send this with an id; it still gets exactly one reply
            "initialized" | "notifications/initialized" => Response::success(id, json!({})),
            "tools/list" => respond(id, &self.tool_list),
            "resources/list" => respond(id, &ListResourcesResult::with_all_items(Vec::new())),
            "prompts/list" => respond(id, &ListPromptsResult::with_all_items(Vec::new())),
            "tools/call" => match self.call_tool(params).await {
                Ok(result) => Response::success(id, result),
                Err(error) => Response::error(id, error),
            },
            _ => Response::error(id, method_not_found(&method)),
        }
    }

    async fn handle_notification(&self, notification: Notification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                tracing::info!("Client initialized");
            }
            // Executed for its side effects; there is nobody to answer
            "tools/call" => {
                if let Err(e) = self.call_tool(notification.params).await {
                    tracing::debug!("Tool call notification failed: {}", e.message);
                }
            }
            other => tracing::debug!("Ignoring notification: {}", other),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> InitializeResult {
        let protocol_version = params
            .and_then(|p| p.get("protocolVersion"))
            .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(ProtocolVersion::V_2024_11_05);

        InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities::builder()
                .enable_tools_with(ToolsCapability {
                    list_changed: Some(false),
                })
                .build(),
            server_info: self.server_info.clone(),
            instructions: None,
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, ErrorData> {
        let mut params = match params {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let name = match params.remove("name") {
            Some(Value::String(name)) if !name.is_empty() => name,
            _ => return Err(ErrorData::invalid_params("params.name is required", None)),
        };
        let arguments = match params.remove("arguments") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::Object(map)) => Value::Object(map),
            Some(_) => {
                return Err(ErrorData::invalid_params(
                    "arguments must be an object",
                    None,
                ));
            }
        };

        let result = self.executor.call(&name, arguments).await.map_err(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            e.to_error_data()
        })?;

        to_result(&result)
    }
}

fn to_result<T: Serialize>(payload: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(payload)
        .map_err(|e| ErrorData::internal_error(format!("failed to serialize result: {}", e), None))
}

fn respond<T: Serialize>(id: RequestId, payload: &T) -> Response {
    match to_result(payload) {
        Ok(result) => Response::success(id, result),
        Err(error) => Response::error(id, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::platform::fake::{Event, FakeDesktop, FakeWindow};
    use std::time::{Duration, Instant};
    use rmcp::model::ErrorCode;
    use winpilot_mcp_protocol::{Outcome, decode_line};

    fn engine() -> ProtocolEngine<FakeDesktop> {
        let desktop = FakeDesktop::new()
            .with_display(1920, 1080)
            .with_window(FakeWindow::new(5, "UnityWndClass", "Game").frame(Rect::new(0, 0, 800, 600)));
        ProtocolEngine::new(ToolExecutor::new(desktop, None))
    }

    async fn send(engine: &ProtocolEngine<FakeDesktop>, line: &str) -> Option<Response> {
        let message = decode_line(line.as_bytes()).expect("line should decode");
        engine.handle(message).await
    }

    fn result(response: Response) -> Value {
        match response.outcome {
            Outcome::Result(value) => value,
            Outcome::Error(e) => panic!("unexpected error: {:?}", e),
        }
    }

    fn error(response: Response) -> ErrorData {
        match response.outcome {
            Outcome::Error(e) => e,
            Outcome::Result(v) => panic!("unexpected result: {}", v),
        }
    }

    #[tokio::test]
    async fn test_initialize_echoes_client_version() {
        let engine = engine();
        let response = send(
            &engine,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(response.id, RequestId::from(1));

        let value = result(response);
        assert_eq!(
            value,
            json!({
                "protocolVersion": "2025-03-26",
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {
                    "name": "winpilot-mcp-server",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })
        );

        // versions this crate has never heard of are echoed too
        let value = result(
            send(
                &engine,
                r#"{"jsonrpc":"2.0","id":2,"method":"initialize","params":{"protocolVersion":"2099-01-01"}}"#,
            )
            .await
            .unwrap(),
        );
        assert_eq!(value["protocolVersion"], json!("2099-01-01"));
    }

    #[tokio::test]
    async fn test_initialize_default_version() {
        let engine = engine();
        for line in [
            r#"{"jsonrpc":"2.0","id":"a","method":"initialize"}"#,
            r#"{"jsonrpc":"2.0","id":"a","method":"initialize","params":{}}"#,
            r#"{"jsonrpc":"2.0","id":"a","method":"initialize","params":[1,2]}"#,
            r#"{"jsonrpc":"2.0","id":"a","method":"initialize","params":{"protocolVersion":""}}"#,
            r#"{"jsonrpc":"2.0","id":"a","method":"initialize","params":{"protocolVersion":5}}"#,
        ] {
            let value = result(send(&engine, line).await.unwrap());
            assert_eq!(value["protocolVersion"], json!("2024-11-05"), "{}", line);
        }
    }

    #[tokio::test]
    async fn test_initialized_notification_has_no_response() {
        let engine = engine();
        for line in [
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"initialized"}"#,
            r#"{"jsonrpc":"2.0","id":null,"method":"initialized"}"#,
        ] {
            assert!(send(&engine, line).await.is_none(), "{}", line);
        }
    }

    #[tokio::test]
    async fn test_tools_list_is_stable() {
        let engine = engine();
        let line = r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#;
        let first = result(send(&engine, line).await.unwrap());
        let second = result(send(&engine, line).await.unwrap());
        assert_eq!(first, second);

        let names: Vec<&str> = first["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["capture", "click", "key", "wait"]);
        assert_eq!(first["tools"][1]["inputSchema"]["additionalProperties"], json!(false));
    }

    #[tokio::test]
    async fn test_empty_resource_and_prompt_lists() {
        let engine = engine();
        let value = result(
            send(&engine, r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
                .await
                .unwrap(),
        );
        assert_eq!(value, json!({"resources": []}));
        let value = result(
            send(&engine, r#"{"jsonrpc":"2.0","id":4,"method":"prompts/list"}"#)
                .await
                .unwrap(),
        );
        assert_eq!(value, json!({"prompts": []}));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let engine = engine();
        let err = error(
            send(&engine, r#"{"jsonrpc":"2.0","id":9,"method":"resources/read"}"#)
                .await
                .unwrap(),
        );
        assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Method not found: resources/read");

        // without an id nothing is sent back
        assert!(
            send(&engine, r#"{"jsonrpc":"2.0","method":"resources/read"}"#)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_wait_scenario() {
        let engine = engine();
        let started = Instant::now();
        let response = send(
            &engine,
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"wait","arguments":{"ms":10}}}"#,
        )
        .await
        .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert_eq!(response.id, RequestId::from(7));

        let value = result(response);
        assert_eq!(value["content"][0]["text"], json!("wait ok: 10ms"));
        assert_eq!(value["isError"], json!(false));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let engine = engine();
        let err = error(
            send(
                &engine,
                r#"{"jsonrpc":"2.0","id":8,"method":"tools/call","params":{"name":"scroll"}}"#,
            )
            .await
            .unwrap(),
        );
        assert_eq!(err.code.0, -32000);
        assert_eq!(err.message, "unknown tool: scroll");
    }

    #[tokio::test]
    async fn test_click_out_of_range() {
        let engine = engine();
        let err = error(
            send(
                &engine,
                r#"{"jsonrpc":"2.0","id":10,"method":"tools/call","params":{"name":"click","arguments":{"x":1.5,"y":0.5}}}"#,
            )
            .await
            .unwrap(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(engine.executor().desktop().events().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_tool_calls() {
        let engine = engine();
        for line in [
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call"}"#,
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"name":""}}"#,
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"name":5}}"#,
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"name":"wait","arguments":[1]}}"#,
            r#"{"jsonrpc":"2.0","id":11,"method":"tools/call","params":{"name":"wait","arguments":{"ms":"soon"}}}"#,
        ] {
            let err = error(send(&engine, line).await.unwrap());
            assert_eq!(err.code, ErrorCode::INVALID_PARAMS, "{}", line);
        }
    }

    #[tokio::test]
    async fn test_target_not_found_is_tool_error() {
        let engine = engine();
        let err = error(
            send(
                &engine,
                r#"{"jsonrpc":"2.0","id":12,"method":"tools/call","params":{"name":"capture","arguments":{"hwnd_class":"Nope"}}}"#,
            )
            .await
            .unwrap(),
        );
        assert_eq!(err.code.0, -32000);
        assert_eq!(err.message, "target window not found");
    }

    #[tokio::test]
    async fn test_tool_call_notification_runs_silently() {
        let engine = engine();
        let response = send(
            &engine,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"key","arguments":{"key":"esc"}}}"#,
        )
        .await;
        assert!(response.is_none());
        assert_eq!(engine.executor().desktop().events().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_tool_call_notification_is_swallowed() {
        let engine = engine();
        for line in [
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":""}}"#,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"click","arguments":{"x":2,"y":0}}}"#,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"capture","arguments":{"hwnd_class":"Nope"}}}"#,
        ] {
            assert!(send(&engine, line).await.is_none(), "{}", line);
        }
        assert!(engine.executor().desktop().events().is_empty());
    }

    #[tokio::test]
    async fn test_request_with_stray_error_field_is_answered() {
        let engine = engine();
        let response = send(
            &engine,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/list","error":"x"}"#,
        )
        .await
        .unwrap();
        assert_eq!(response.id, RequestId::from(5));
        assert_eq!(result(response)["tools"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_capture_through_engine() {
        let engine = engine();
        let value = result(
            send(
                &engine,
                r#"{"jsonrpc":"2.0","id":13,"method":"tools/call","params":{"name":"capture","arguments":{"target":"screen","max_width":640,"max_height":640}}}"#,
            )
            .await
            .unwrap(),
        );
        assert_eq!(value["metadata"]["width"], json!(640));
        assert_eq!(value["metadata"]["height"], json!(360));
        assert_eq!(value["content"][1]["mimeType"], json!("image/jpeg"));
        assert_eq!(
            engine.executor().desktop().events(),
            vec![Event::Capture(Rect::new(0, 0, 1920, 1080))]
        );
    }

    #[tokio::test]
    async fn test_client_responses_are_ignored() {
        let engine = engine();
        assert!(
            send(&engine, r#"{"jsonrpc":"2.0","id":1,"result":{}}"#)
                .await
                .is_none()
        );
    }
}
