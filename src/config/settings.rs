//! Configuration settings for Skylark.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub sheets: SheetsSettings,
    pub agent: AgentSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Backend holding the fleet tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreProvider {
    /// Google Sheets via a service account (default).
    #[default]
    Sheets,
    /// In-memory tables loaded from a JSON fixture.
    Memory,
}

impl std::str::FromStr for StoreProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sheets" | "google" => Ok(StoreProvider::Sheets),
            "memory" | "fixture" => Ok(StoreProvider::Memory),
            _ => Err(format!("Unknown store provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreProvider::Sheets => write!(f, "sheets"),
            StoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Spreadsheet access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsSettings {
    /// Store backend (sheets, memory).
    pub provider: StoreProvider,
    /// Spreadsheet key (the id in the sheet URL).
    pub spreadsheet_id: String,
    /// Path to the service account JSON key.
    pub service_account_file: String,
    /// JSON fixture for the memory provider.
    pub fixture_path: Option<String>,
    /// Tab holding the pilot roster.
    pub pilot_tab: String,
    /// Tab holding the drone fleet.
    pub drone_tab: String,
    /// Tab holding the missions.
    pub mission_tab: String,
    /// Timeout for Sheets API requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            provider: StoreProvider::Sheets,
            spreadsheet_id: String::new(),
            service_account_file: "service_account.json".to_string(),
            fixture_path: None,
            pilot_tab: "pilot_roster".to_string(),
            drone_tab: "drone_fleet".to_string(),
            mission_tab: "missions".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Agent and model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Chat model name.
    pub model: String,
    /// Base URL of the OpenAI-compatible chat completions API.
    pub api_base: String,
    /// Attempts per turn before the error is surfaced.
    pub max_attempts: usize,
    /// Fixed delay between attempts in seconds.
    pub retry_delay_secs: u64,
    /// Maximum model round trips within one exchange.
    pub max_tool_iterations: usize,
    /// Timeout for model requests in seconds.
    pub request_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            max_attempts: 2,
            retry_delay_secs: 2,
            max_tool_iterations: 10,
            request_timeout_secs: 120,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SkylarkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skylark")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded service account key path.
    pub fn service_account_path(&self) -> PathBuf {
        Self::expand_path(&self.sheets.service_account_file)
    }

    /// Get the expanded fixture path, if one is configured.
    pub fn fixture_path(&self) -> Option<PathBuf> {
        self.sheets.fixture_path.as_deref().map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.sheets.pilot_tab, "pilot_roster");
        assert_eq!(settings.sheets.drone_tab, "drone_fleet");
        assert_eq!(settings.sheets.mission_tab, "missions");
        assert_eq!(settings.agent.max_attempts, 2);
        assert_eq!(settings.agent.retry_delay_secs, 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[sheets]\nprovider = \"memory\"\nspreadsheet_id = \"abc123\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.sheets.provider, StoreProvider::Memory);
        assert_eq!(settings.sheets.spreadsheet_id, "abc123");
        assert_eq!(settings.sheets.pilot_tab, "pilot_roster");
        assert_eq!(settings.agent.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.agent.model = "gpt-4o-mini".to_string();
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.agent.model, "gpt-4o-mini");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.sheets.provider, StoreProvider::Sheets);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Sheets".parse::<StoreProvider>().unwrap(), StoreProvider::Sheets);
        assert_eq!("memory".parse::<StoreProvider>().unwrap(), StoreProvider::Memory);
        assert!("sqlite".parse::<StoreProvider>().is_err());
    }
}
