//! MCP server implementation.

use super::protocol::*;
use super::tools::get_tools;
use crate::agent::{parse_tool_value, ToolContext};
use crate::config::Settings;
use crate::coordinator::Coordinator;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "skylark";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for Skylark.
pub struct McpServer {
    settings: Settings,
    tools: Option<ToolContext>,
}

impl McpServer {
    /// Create a new MCP server. The store is opened on `initialize`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            tools: None,
        }
    }

    /// Create a server around an already opened store.
    pub fn with_tools(settings: Settings, tools: ToolContext) -> Self {
        Self {
            settings,
            tools: Some(tools),
        }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        // Log to stderr so it doesn't interfere with JSON-RPC
        eprintln!("Skylark MCP server starting...");

        for line in stdin.lock().lines() {
            let line = line?;
            if let Some(response) = self.handle_line(&line).await {
                writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Handle one line of input. Notifications produce no response.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        if line.trim().is_empty() {
            return None;
        }

        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"))
            }
        }
    }

    /// Handle a single JSON-RPC request.
    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                INVALID_REQUEST,
                "Invalid Request: jsonrpc must be \"2.0\"",
            ));
        }

        if request.id.is_none() && request.method.starts_with("notifications/") {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    /// Handle initialize request.
    fn handle_initialize(&mut self, id: Option<Value>) -> JsonRpcResponse {
        if self.tools.is_none() {
            match Coordinator::new(self.settings.clone()) {
                Ok(coordinator) => {
                    self.tools = Some(coordinator.tools());
                    info!("Fleet store opened");
                }
                Err(e) => {
                    warn!("Failed to open fleet store: {}", e);
                    return JsonRpcResponse::error(id, SERVER_ERROR, &format!("Init failed: {}", e));
                }
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability { list_changed: false },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        respond(id, result)
    }

    /// Handle tools/list request.
    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        respond(id, ToolsListResult { tools: get_tools() })
    }

    /// Handle tools/call request.
    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        &format!("Invalid params: {}", e),
                    )
                }
            },
            None => return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"),
        };

        let Some(tools) = &self.tools else {
            return respond(id, ToolCallResult::error("Server not initialized".to_string()));
        };

        let arguments = params.arguments.unwrap_or_else(|| json!({}));
        let result = match parse_tool_value(&params.name, &arguments) {
            Ok(tool) => {
                info!("MCP calling tool: {}", tool.name());
                match tools.execute(&tool).await {
                    Ok(output) => ToolCallResult::text(output),
                    Err(e) => ToolCallResult::error(format!("{} failed: {}", tool.name(), e)),
                }
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        };

        respond(id, result)
    }
}

fn respond<T: serde::Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, SERVER_ERROR, &e.to_string()),
    }
}
