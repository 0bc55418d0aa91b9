//! Spreadsheet access layer.
//!
//! Provides a trait-based interface over the three fleet tables, with a
//! Google Sheets backend and an in-memory backend. Every read is a full live
//! snapshot; the only write is the pilot status cell.

mod auth;
mod memory;
mod sheets;

pub use auth::{ServiceAccountKey, TokenProvider, SHEETS_SCOPES};
pub use memory::{Fixture, MemoryStore};
pub use sheets::SheetsStore;

use crate::config::{Settings, SheetsSettings, StoreProvider};
use crate::error::{Result, SkylarkError};
use crate::fleet::{FleetSnapshot, Row};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Marker embedded in a write confirmation once the cell has been read back.
pub const VERIFICATION_TAG: &str = "VERIFIED_SYNC";

/// 1-based column holding the pilot id.
pub const ID_COLUMN: usize = 1;
/// 1-based column holding the pilot name.
pub const NAME_COLUMN: usize = 2;
/// 1-based column holding the pilot status.
pub const STATUS_COLUMN: usize = 6;

/// Tab names of the three tables.
#[derive(Debug, Clone, PartialEq)]
pub struct TableNames {
    pub pilots: String,
    pub drones: String,
    pub missions: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self::from(&SheetsSettings::default())
    }
}

impl From<&SheetsSettings> for TableNames {
    fn from(settings: &SheetsSettings) -> Self {
        Self {
            pilots: settings.pilot_tab.clone(),
            drones: settings.drone_tab.clone(),
            missions: settings.mission_tab.clone(),
        }
    }
}

impl TableNames {
    pub fn all(&self) -> [&str; 3] {
        [
            self.pilots.as_str(),
            self.drones.as_str(),
            self.missions.as_str(),
        ]
    }
}

/// Outcome of a status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// The cell was written and read back.
    Verified {
        pilot_id: String,
        name: String,
        status: String,
        row: usize,
    },
    /// No row carries the id; nothing was written.
    NotFound { pilot_id: String },
}

impl StatusUpdate {
    pub fn is_verified(&self) -> bool {
        matches!(self, StatusUpdate::Verified { .. })
    }
}

impl std::fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusUpdate::Verified {
                pilot_id,
                name,
                status,
                row,
            } => write!(
                f,
                "{}: {} ({}) is now {} at row {}.",
                VERIFICATION_TAG, name, pilot_id, status, row
            ),
            StatusUpdate::NotFound { pilot_id } => {
                write!(f, "ERROR: Pilot ID {} not found.", pilot_id)
            }
        }
    }
}

/// Title and tabs of the backing spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreInfo {
    pub title: String,
    pub tabs: Vec<String>,
}

impl StoreInfo {
    /// Expected tabs that the spreadsheet lacks.
    pub fn missing_tabs<'a>(&self, tables: &'a TableNames) -> Vec<&'a str> {
        tables
            .all()
            .into_iter()
            .filter(|t| !self.tabs.iter().any(|tab| tab.as_str() == *t))
            .collect()
    }
}

/// Trait for fleet table backends.
#[async_trait]
pub trait FleetStore: Send + Sync {
    /// Read all three tables as they are right now.
    async fn fetch_all(&self) -> Result<FleetSnapshot>;

    /// Overwrite one pilot's status cell and read it back.
    async fn update_pilot_status(&self, pilot_id: &str, new_status: &str) -> Result<StatusUpdate>;

    /// Spreadsheet title and tab names.
    async fn describe(&self) -> Result<StoreInfo>;
}

/// Build the store selected in the settings.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn FleetStore>> {
    let tables = TableNames::from(&settings.sheets);
    match settings.sheets.provider {
        StoreProvider::Sheets => {
            let store = SheetsStore::from_settings(&settings.sheets, &settings.service_account_path())?;
            Ok(Arc::new(store))
        }
        StoreProvider::Memory => {
            let path = settings.fixture_path().ok_or_else(|| {
                SkylarkError::Config(
                    "sheets.fixture_path must be set for the memory provider".to_string(),
                )
            })?;
            Ok(Arc::new(MemoryStore::from_fixture(&path, tables)?))
        }
    }
}

/// Turn a header-first cell grid into records.
///
/// Short rows are padded with empty strings, blank rows are skipped and
/// columns without a header are ignored.
pub fn records_from_grid(grid: &[Vec<String>]) -> Vec<Row> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };

    rows.iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            header
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.trim().is_empty())
                .map(|(i, name)| {
                    let value = row.get(i).cloned().unwrap_or_default();
                    (name.trim().to_string(), value)
                })
                .collect()
        })
        .collect()
}

/// 1-based row of the first exact id match in an id column (header included).
pub fn locate_row(ids: &[String], pilot_id: &str) -> Option<usize> {
    ids.iter().position(|id| id == pilot_id).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_records_from_grid() {
        let records = records_from_grid(&grid(&[
            &["pilot_id", "name", "", "status"],
            &["P001", "Arjun", "ignored", "Available"],
            &["", "", "", ""],
            &["P002", "Neha"],
        ]));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["status"], "Available");
        assert!(!records[0].contains_key(""));
        assert_eq!(records[1]["name"], "Neha");
        assert_eq!(records[1]["status"], "");
    }

    #[test]
    fn test_records_from_empty_grid() {
        assert!(records_from_grid(&[]).is_empty());
        assert!(records_from_grid(&grid(&[&["pilot_id"]])).is_empty());
    }

    #[test]
    fn test_locate_row_is_exact_and_one_based() {
        let ids: Vec<String> = ["pilot_id", "P001", "P002", "P002"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(locate_row(&ids, "P001"), Some(2));
        assert_eq!(locate_row(&ids, "P002"), Some(3));
        assert_eq!(locate_row(&ids, "p001"), None);
        assert_eq!(locate_row(&ids, "P00"), None);
    }

    #[test]
    fn test_status_update_messages() {
        let verified = StatusUpdate::Verified {
            pilot_id: "P001".to_string(),
            name: "Arjun".to_string(),
            status: "On Leave".to_string(),
            row: 2,
        };
        assert_eq!(
            verified.to_string(),
            "VERIFIED_SYNC: Arjun (P001) is now On Leave at row 2."
        );

        let missing = StatusUpdate::NotFound {
            pilot_id: "P999".to_string(),
        };
        assert_eq!(missing.to_string(), "ERROR: Pilot ID P999 not found.");
        assert!(!missing.to_string().contains(VERIFICATION_TAG));
    }

    #[test]
    fn test_missing_tabs() {
        let info = StoreInfo {
            title: "Skylark".to_string(),
            tabs: vec!["pilot_roster".to_string(), "missions".to_string()],
        };
        assert_eq!(info.missing_tabs(&TableNames::default()), vec!["drone_fleet"]);
    }

    #[test]
    fn test_memory_provider_requires_fixture() {
        let mut settings = Settings::default();
        settings.sheets.provider = StoreProvider::Memory;
        assert!(matches!(
            create_store(&settings),
            Err(SkylarkError::Config(_))
        ));
    }
}
