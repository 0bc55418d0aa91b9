//! Pre-flight checks before talking to remote services.
//!
//! Validates that credentials and store configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::{Settings, StoreProvider};
use crate::error::{Result, SkylarkError};
use crate::openai::{ApiKey, API_KEY_ENV_VARS};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Talking to the coordinator requires an API key and a store.
    Chat,
    /// Direct reads and writes only need the store.
    Store,
}

/// Run pre-flight checks for the given operation.
///
/// Returns the resolved API key for [`Operation::Chat`].
pub fn check(
    operation: Operation,
    settings: &Settings,
    api_key: Option<&str>,
) -> Result<Option<ApiKey>> {
    check_store(settings)?;
    match operation {
        Operation::Chat => Ok(Some(check_api_key(api_key)?)),
        Operation::Store => Ok(None),
    }
}

/// Resolve the model API key from the flag or the environment.
pub fn check_api_key(explicit: Option<&str>) -> Result<ApiKey> {
    ApiKey::resolve(explicit).ok_or_else(|| {
        SkylarkError::Config(format!(
            "No API key found. Pass --api-key or set one of: {}",
            API_KEY_ENV_VARS.join(", ")
        ))
    })
}

/// Check that the configured store can be built.
pub fn check_store(settings: &Settings) -> Result<()> {
    match settings.sheets.provider {
        StoreProvider::Sheets => {
            if settings.sheets.spreadsheet_id.trim().is_empty() {
                return Err(SkylarkError::Config(
                    "sheets.spreadsheet_id is not set. Run 'skylark init'.".to_string(),
                ));
            }
            let key_path = settings.service_account_path();
            if !key_path.exists() {
                return Err(SkylarkError::Auth(format!(
                    "Service account file not found: {}",
                    key_path.display()
                )));
            }
        }
        StoreProvider::Memory => {
            let path = settings.fixture_path().ok_or_else(|| {
                SkylarkError::Config(
                    "sheets.fixture_path must be set for the memory provider".to_string(),
                )
            })?;
            if !path.exists() {
                return Err(SkylarkError::Config(format!(
                    "Fixture file not found: {}",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_spreadsheet_id() {
        let err = check(Operation::Store, &Settings::default(), None).unwrap_err();
        assert!(err.to_string().contains("spreadsheet_id"));
    }

    #[test]
    fn test_memory_store_with_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("fleet.json");
        std::fs::write(&fixture, "{}").unwrap();

        let mut settings = Settings::default();
        settings.sheets.provider = StoreProvider::Memory;
        settings.sheets.fixture_path = Some(fixture.to_string_lossy().to_string());

        assert!(check(Operation::Store, &settings, None).unwrap().is_none());

        let key = check(Operation::Chat, &settings, Some("test-key-123456"))
            .unwrap()
            .unwrap();
        assert_eq!(key.expose(), "test-key-123456");
    }

    #[test]
    fn test_missing_service_account_file() {
        let mut settings = Settings::default();
        settings.sheets.spreadsheet_id = "abc".to_string();
        settings.sheets.service_account_file = "/nonexistent/key.json".to_string();

        let err = check_store(&settings).unwrap_err();
        assert!(matches!(err, SkylarkError::Auth(_)));
    }
}
