//! MCP server over stdio
//!
//! Speaks JSON-RPC 2.0, one message per line: requests arrive on stdin,
//! responses leave on stdout. `tools/list` and `tools/call` are dispatched
//! to the tool registry; the rest is protocol bookkeeping.
//!
//! Tool handler failures are not protocol errors. They come back as a
//! normal `tools/call` result carrying the failure text and `isError`, so
//! clients can show them to the model. Protocol errors (`-32xxx` codes) are
//! reserved for malformed messages, unknown methods, unknown tools, and
//! arguments that fail schema validation.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{sanitize_error_message, ServerError};
use crate::tools::{ToolError, ToolRegistry};

/// Protocol revision implemented by this server
const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
/// Name reported in the initialize handshake
const SERVER_NAME: &str = "airtable";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC response envelope
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

fn success_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

fn error_response(id: Value, code: i64, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError { code, message }),
    }
}

/// MCP server dispatching tool calls from a JSON-RPC stream
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Number of registered tools
    pub fn tool_count(&self) -> usize {
        self.registry.len()
    }

    /// Serve on stdin/stdout until stdin reaches EOF
    pub async fn serve_stdio(&self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve until the reader is exhausted. Generic so tests can drive the
    /// loop over in-memory pipes.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let Some(response) = self.handle_line(&line).await else {
                continue;
            };

            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            writer.write_all(payload.as_bytes()).await?;
            writer.flush().await?;
        }

        Ok(())
    }

    /// Handle one line. Returns `None` when no response is owed (blank
    /// input is filtered by the caller; notifications and stray client
    /// responses are ignored here).
    async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                return Some(error_response(
                    Value::Null,
                    PARSE_ERROR,
                    format!("Parse error: {e}"),
                ))
            }
        };

        let Some(object) = message.as_object() else {
            return Some(error_response(
                Value::Null,
                INVALID_REQUEST,
                "request must be a JSON object".to_string(),
            ));
        };

        if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            let id = object.get("id").cloned().unwrap_or(Value::Null);
            return Some(error_response(
                id,
                INVALID_REQUEST,
                "jsonrpc must be \"2.0\"".to_string(),
            ));
        }

        let Some(method) = object.get("method").and_then(Value::as_str) else {
            // A message without a method is a client response; this server
            // never issues outbound requests, so there is nothing to route
            // it to.
            return None;
        };

        let params = object.get("params").cloned().unwrap_or(Value::Null);

        match object.get("id") {
            Some(id) => Some(self.handle_request(id.clone(), method, params).await),
            None => {
                self.handle_notification(method);
                None
            }
        }
    }

    async fn handle_request(&self, id: Value, method: &str, params: Value) -> JsonRpcResponse {
        match method {
            "initialize" => success_response(id, self.initialize_result()),
            "ping" => success_response(id, json!({})),
            "tools/list" => success_response(id, self.tools_list_result()),
            "tools/call" => self.handle_tools_call(id, params).await,
            _ => error_response(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {method}"),
            ),
        }
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" => {
                tracing::debug!("client reported initialization complete");
            }
            "notifications/cancelled" => {
                // Calls run to completion; there is nothing in flight to cancel
                tracing::debug!("ignoring cancellation notification");
            }
            other => {
                tracing::debug!(method = other, "ignoring unknown notification");
            }
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<Value> = self
            .registry
            .descriptions()
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();

        json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return error_response(
                id,
                INVALID_PARAMS,
                "tools/call requires a string 'name'".to_string(),
            );
        };

        let arguments = match params.get("arguments") {
            Some(arguments @ Value::Object(_)) => arguments.clone(),
            Some(Value::Null) | None => json!({}),
            Some(_) => {
                return error_response(
                    id,
                    INVALID_PARAMS,
                    "tools/call 'arguments' must be an object".to_string(),
                )
            }
        };

        tracing::debug!(tool = name, "dispatching tool call");

        match self.registry.execute_tool(name, &arguments).await {
            Ok(output) => success_response(
                id,
                json!({
                    "content": [{ "type": "text", "text": output.text }]
                }),
            ),
            Err(error @ (ToolError::UnknownTool(_) | ToolError::ValidationError(_))) => {
                error_response(id, INVALID_PARAMS, error.to_string())
            }
            Err(ToolError::SchemaError(message)) => error_response(id, INTERNAL_ERROR, message),
            Err(error) => {
                tracing::warn!(
                    tool = name,
                    error = %sanitize_error_message(&error.to_string()),
                    "tool call failed"
                );
                success_response(
                    id,
                    json!({
                        "content": [{ "type": "text", "text": error.to_string() }],
                        "isError": true
                    }),
                )
            }
        }
    }
}
