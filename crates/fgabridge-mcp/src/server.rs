//! MCP server implementation.
//!
//! `McpServer` owns the tool catalog and the shared client provider, and
//! turns JSON-RPC requests into responses. The stdio transport lives here;
//! the HTTP/SSE transport in [`crate::http`] feeds the same handler.

use crate::catalog::ToolRegistry;
use crate::dispatch::{self, DispatchError};
use crate::error::McpError;
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse, ToolContent};
use fgabridge_client::ClientProvider;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// The MCP server.
pub struct McpServer {
    provider: Arc<ClientProvider>,
    tools: ToolRegistry,
}

impl McpServer {
    /// Create a server exposing the builtin catalog over `provider`.
    pub fn new(provider: Arc<ClientProvider>) -> Self {
        Self {
            provider,
            tools: ToolRegistry::builtin(),
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn provider(&self) -> &Arc<ClientProvider> {
        &self.provider
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => {
                tracing::info!("shutdown requested");
                JsonRpcResponse::success(id, Value::Null)
            }
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "fgabridge",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.tools.list() }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        let client = match self.provider.client().await {
            Ok(client) => client,
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "client acquisition failed");
                return JsonRpcResponse::error(id, -32603, e.to_string());
            }
        };

        match dispatch::dispatch(&client, &self.tools, &params.name, &params.arguments).await {
            Ok(result) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [ToolContent::text(result)],
                    "isError": false
                }),
            ),
            Err(e @ DispatchError::UnsupportedTool(_)) => {
                JsonRpcResponse::error(id, -32602, e.to_string())
            }
            Err(e @ DispatchError::MissingArguments { .. }) => {
                JsonRpcResponse::error(id, -32602, e.to_string())
            }
        }
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF.
    ///
    /// Notifications (requests without an id) are handled but produce no
    /// output line; stdout carries nothing but protocol responses.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("serving MCP over stdio");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => {
                    let is_notification = request.id.is_none();
                    let response = self.handle_request(request).await;
                    if is_notification {
                        continue;
                    }
                    response
                }
                Err(e) => JsonRpcResponse::error(None, -32700, format!("Parse error: {e}")),
            };

            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            stdout.write_all(&payload).await?;
            stdout.flush().await?;
        }

        self.provider.close().await;
        Ok(())
    }
}
