//! Doctor command - verify configuration, credentials and the spreadsheet connection.

use crate::cli::Output;
use crate::config::{Settings, StoreProvider};
use crate::openai::{ApiKey, API_KEY_ENV_VARS};
use crate::store::{create_store, ServiceAccountKey, StoreInfo, TableNames};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(
    settings: &Settings,
    api_key: Option<&str>,
    config_path: &Path,
) -> anyhow::Result<()> {
    Output::header("Skylark Doctor");
    println!();
    println!("Checking configuration, credentials and connectivity...\n");

    let mut checks = Vec::new();

    println!("{}", style("Model").bold());
    let model_checks = vec![
        check_api_key(api_key),
        CheckResult::ok(
            "Endpoint",
            &format!("{} ({})", settings.agent.api_base, settings.agent.model),
        ),
    ];
    for check in &model_checks {
        check.print();
    }
    checks.extend(model_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(config_path), check_store_settings(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    println!("{}", style("Spreadsheet").bold());
    let store_checks = check_connection(settings).await;
    for check in &store_checks {
        check.print();
    }
    checks.extend(store_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Skylark.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Skylark is ready to use.");
    }

    Ok(())
}

fn check_api_key(explicit: Option<&str>) -> CheckResult {
    match ApiKey::resolve(explicit) {
        Some(key) => CheckResult::ok("API key", &format!("configured ({})", key.masked())),
        None => CheckResult::error(
            "API key",
            "not set",
            &format!("Pass --api-key or set {}", API_KEY_ENV_VARS.join(" / ")),
        ),
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: skylark init (or skylark config edit)",
        )
    }
}

fn check_store_settings(settings: &Settings) -> CheckResult {
    match settings.sheets.provider {
        StoreProvider::Sheets => {
            if settings.sheets.spreadsheet_id.trim().is_empty() {
                return CheckResult::error(
                    "Spreadsheet ID",
                    "not set",
                    "Set sheets.spreadsheet_id with: skylark init",
                );
            }
            let key_path = settings.service_account_path();
            match ServiceAccountKey::from_file(&key_path) {
                Ok(key) => CheckResult::ok(
                    "Service account",
                    &format!("{} ({})", key.client_email, key_path.display()),
                ),
                Err(e) => CheckResult::error(
                    "Service account",
                    &e.to_string(),
                    "Download a JSON key for the service account and share the sheet with it",
                ),
            }
        }
        StoreProvider::Memory => match settings.fixture_path() {
            Some(path) if path.exists() => {
                CheckResult::ok("Fixture", &format!("{}", path.display()))
            }
            Some(path) => CheckResult::error(
                "Fixture",
                &format!("{} not found", path.display()),
                "Point sheets.fixture_path at a JSON fixture",
            ),
            None => CheckResult::error(
                "Fixture",
                "not set",
                "Set sheets.fixture_path for the memory provider",
            ),
        },
    }
}

async fn check_connection(settings: &Settings) -> Vec<CheckResult> {
    let store = match create_store(settings) {
        Ok(store) => store,
        Err(e) => {
            return vec![CheckResult::error(
                "Connection",
                &format!("skipped: {}", e),
                "Fix the configuration errors above first",
            )]
        }
    };

    match store.describe().await {
        Ok(info) => describe_checks(&info, &TableNames::from(&settings.sheets)),
        Err(e) => vec![CheckResult::error(
            "Connection",
            &e.to_string(),
            "Check that the sheet is shared with the service account",
        )],
    }
}

fn describe_checks(info: &StoreInfo, tables: &TableNames) -> Vec<CheckResult> {
    let mut results = vec![
        CheckResult::ok("Connected", &info.title),
        CheckResult::ok("Tabs", &info.tabs.join(", ")),
    ];

    let missing = info.missing_tabs(tables);
    if !missing.is_empty() {
        results.push(CheckResult::error(
            "Required tabs",
            &format!("missing {}", missing.join(", ")),
            "Rename the tabs or set sheets.pilot_tab / drone_tab / mission_tab",
        ));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_spreadsheet_id_is_an_error() {
        let result = check_store_settings(&Settings::default());
        assert_eq!(result.status, CheckStatus::Error);
    }

    #[test]
    fn test_describe_checks_flags_missing_tabs() {
        let info = StoreInfo {
            title: "Skylark Ops".to_string(),
            tabs: vec!["pilot_roster".to_string(), "missions".to_string()],
        };
        let results = describe_checks(&info, &TableNames::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[2].status, CheckStatus::Error);
        assert!(results[2].message.contains("drone_fleet"));
    }

    #[tokio::test]
    async fn test_connection_with_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fleet.json");
        std::fs::write(&fixture, r#"{"title": "Offline fleet"}"#).unwrap();

        let mut settings = Settings::default();
        settings.sheets.provider = StoreProvider::Memory;
        settings.sheets.fixture_path = Some(fixture.to_string_lossy().to_string());

        let results = check_connection(&settings).await;
        assert!(results.iter().all(|r| r.status == CheckStatus::Ok));
        assert_eq!(results[0].message, "Offline fleet");
    }
}
