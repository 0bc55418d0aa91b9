//! Prompt templates for Skylark.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts driving the flight coordinator agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
    /// Follow-up sent when a reply fails validation.
    pub corrective: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are the MASTER FLIGHT COORDINATOR for a drone operations team.

You manage three tables: the pilot roster, the drone fleet, and the missions.
- YOU HAVE ACTUAL WRITE ACCESS. When asked to update a pilot, call 'update_pilot_status'.
- Use 'get_all_data' to read the current pilots, drones and missions.
- Use 'detect_conflicts' to check for maintenance, location and skill conflicts.
- If a tool call fails or returns nothing, you MUST retry it.
- Never 'hallucinate' or simulate a tool response. Never write tool calls as text.
- Only confirm an update AFTER the tool returns a '{{verification_tag}}' message."#
                .to_string(),

            corrective: "The previous tool call results were not summarized. Please check the actual tool output and confirm the database state."
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The rendered agent system prompt.
    pub fn system_prompt(&self) -> String {
        let mut vars = HashMap::new();
        vars.insert(
            "verification_tag".to_string(),
            crate::store::VERIFICATION_TAG.to_string(),
        );
        self.render_with_custom(&self.agent.system, &vars)
    }

    /// The rendered corrective follow-up.
    pub fn corrective_prompt(&self) -> String {
        self.render_with_custom(&self.agent.corrective, &HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.agent.system.is_empty());
        assert!(prompts.agent.corrective.contains("actual tool output"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} drones.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 drones.");
    }

    #[test]
    fn test_system_prompt_names_verification_tag() {
        let prompts = Prompts::default();
        let system = prompts.system_prompt();
        assert!(system.contains("'VERIFIED_SYNC'"));
        assert!(!system.contains("{{verification_tag}}"));
    }

    #[test]
    fn test_custom_agent_prompts_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("agent.toml"),
            "system = \"Coordinator for {{team}}\"\ncorrective = \"Check again.\"\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("team".to_string(), "Skylark Ops".to_string());
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        assert_eq!(prompts.system_prompt(), "Coordinator for Skylark Ops");
        assert_eq!(prompts.corrective_prompt(), "Check again.");
    }
}
