//! Tool definitions and implementations for the coordinator agent.

use crate::error::{Result, SkylarkError};
use crate::fleet::detect_conflicts;
use crate::store::FleetStore;
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Names of every tool the agent can call.
pub const TOOL_NAMES: [&str; 3] = ["get_all_data", "update_pilot_status", "detect_conflicts"];

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum FleetTool {
    /// Read the pilot roster, drone fleet and missions.
    GetAllData,

    /// Overwrite one pilot's status.
    UpdatePilotStatus { pilot_id: String, new_status: String },

    /// Run the conflict checks over a fresh snapshot.
    DetectConflicts,
}

impl FleetTool {
    pub fn name(&self) -> &'static str {
        match self {
            FleetTool::GetAllData => "get_all_data",
            FleetTool::UpdatePilotStatus { .. } => "update_pilot_status",
            FleetTool::DetectConflicts => "detect_conflicts",
        }
    }

    /// Whether the tool mutates the sheet.
    pub fn is_write(&self) -> bool {
        matches!(self, FleetTool::UpdatePilotStatus { .. })
    }
}

/// Declared contract of one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Tool catalog shared by the chat agent and the MCP server.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "get_all_data",
            description: "Fetches all current data for Pilots, Drones, and Missions. \
                Use this before answering questions about the fleet.",
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
        ToolSpec {
            name: "update_pilot_status",
            description: "Updates a pilot's status in the Google Sheet. \
                Accepts pilot_id (e.g., 'P001') and new_status (e.g., 'On Leave'). \
                Returns a VERIFIED_SYNC message once the sheet has been updated.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "pilot_id": {
                        "type": "string",
                        "description": "The pilot ID, e.g. 'P001'"
                    },
                    "new_status": {
                        "type": "string",
                        "description": "The new status, e.g. 'Available', 'On Leave', 'Assigned'"
                    }
                },
                "required": ["pilot_id", "new_status"]
            }),
        },
        ToolSpec {
            name: "detect_conflicts",
            description: "Identifies drones in maintenance assigned to active missions, \
                pilots assigned away from their mission's location, and pilots missing \
                a mission's required skill.",
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    ]
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<ChatCompletionTool> {
    tool_specs()
        .into_iter()
        .map(|spec| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: spec.name.to_string(),
                description: Some(spec.description.to_string()),
                parameters: Some(spec.parameters),
                strict: None,
            },
        })
        .collect()
}

/// Parse a tool call from the chat completion format (JSON-encoded arguments).
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<FleetTool> {
    let args: Value = if arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| SkylarkError::Tool(format!("Invalid tool arguments: {}", e)))?
    };
    parse_tool_value(name, &args)
}

/// Parse a tool call from already-decoded arguments.
pub fn parse_tool_value(name: &str, args: &Value) -> Result<FleetTool> {
    match name {
        "get_all_data" => Ok(FleetTool::GetAllData),
        "update_pilot_status" => {
            let pilot_id = required_str(args, "pilot_id")?;
            let new_status = required_str(args, "new_status")?;
            Ok(FleetTool::UpdatePilotStatus {
                pilot_id,
                new_status,
            })
        }
        "detect_conflicts" => Ok(FleetTool::DetectConflicts),
        _ => Err(SkylarkError::Tool(format!("Unknown tool: {}", name))),
    }
}

fn required_str(args: &Value, key: &str) -> Result<String> {
    let value = args[key]
        .as_str()
        .map(str::trim)
        .ok_or_else(|| SkylarkError::Tool(format!("Missing '{}' argument", key)))?;
    if value.is_empty() {
        return Err(SkylarkError::Tool(format!("Empty '{}' argument", key)));
    }
    Ok(value.to_string())
}

/// Tool execution context with access to the fleet store.
#[derive(Clone)]
pub struct ToolContext {
    store: Arc<dyn FleetStore>,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(store: Arc<dyn FleetStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn FleetStore> {
        &self.store
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &FleetTool) -> Result<String> {
        match tool {
            FleetTool::GetAllData => {
                let snapshot = self.store.fetch_all().await?;
                Ok(serde_json::to_string_pretty(&snapshot)?)
            }
            FleetTool::UpdatePilotStatus {
                pilot_id,
                new_status,
            } => {
                let update = self.store.update_pilot_status(pilot_id, new_status).await?;
                Ok(update.to_string())
            }
            FleetTool::DetectConflicts => {
                let snapshot = self.store.fetch_all().await?;
                Ok(detect_conflicts(&snapshot).to_string())
            }
        }
    }
}
