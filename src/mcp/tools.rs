//! MCP tool definitions for Skylark.

use super::protocol::Tool;
use crate::agent::tool_specs;

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    tool_specs()
        .into_iter()
        .map(|spec| Tool {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            input_schema: spec.parameters,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TOOL_NAMES;

    #[test]
    fn test_tools_mirror_agent_catalog() {
        let tools = get_tools();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TOOL_NAMES.to_vec());
        assert_eq!(tools[1].input_schema["required"][0], "pilot_id");
    }
}
