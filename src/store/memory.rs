//! In-memory fleet store.
//!
//! Holds each tab as a header-first cell grid, the same shape the Sheets API
//! returns, so row numbers and column positions behave like the real sheet.
//! Useful for offline runs against a fixture and for testing.

use super::{
    locate_row, records_from_grid, FleetStore, StatusUpdate, StoreInfo, TableNames, ID_COLUMN,
    NAME_COLUMN, STATUS_COLUMN,
};
use crate::error::{Result, SkylarkError};
use crate::fleet::FleetSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::info;

type Grid = Vec<Vec<String>>;

/// Fixture file layout: one header-first grid per table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub pilots: Grid,
    #[serde(default)]
    pub drones: Grid,
    #[serde(default)]
    pub missions: Grid,
}

/// In-memory fleet store.
pub struct MemoryStore {
    title: String,
    tables: TableNames,
    grids: RwLock<HashMap<String, Grid>>,
}

impl MemoryStore {
    /// Create a store from three grids.
    pub fn new(tables: TableNames, pilots: Grid, drones: Grid, missions: Grid) -> Self {
        let mut grids = HashMap::new();
        grids.insert(tables.pilots.clone(), pilots);
        grids.insert(tables.drones.clone(), drones);
        grids.insert(tables.missions.clone(), missions);

        Self {
            title: "In-memory fleet".to_string(),
            tables,
            grids: RwLock::new(grids),
        }
    }

    pub fn from_fixture_data(fixture: Fixture, tables: TableNames) -> Self {
        let mut store = Self::new(tables, fixture.pilots, fixture.drones, fixture.missions);
        if let Some(title) = fixture.title {
            store.title = title;
        }
        store
    }

    /// Load a JSON fixture file.
    pub fn from_fixture(path: &Path, tables: TableNames) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkylarkError::Config(format!("Cannot read fixture {}: {}", path.display(), e))
        })?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        Ok(Self::from_fixture_data(fixture, tables))
    }

    /// Copy of one tab's grid.
    pub fn grid(&self, tab: &str) -> Result<Grid> {
        let grids = self.read()?;
        Ok(grids.get(tab).cloned().unwrap_or_default())
    }

    /// Value at a 1-based (row, column), if the cell exists.
    pub fn cell(&self, tab: &str, row: usize, column: usize) -> Result<Option<String>> {
        let grids = self.read()?;
        Ok(cell_value(grids.get(tab), row, column))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Grid>>> {
        self.grids
            .read()
            .map_err(|_| SkylarkError::Sheets("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Grid>>> {
        self.grids
            .write()
            .map_err(|_| SkylarkError::Sheets("in-memory store lock poisoned".to_string()))
    }
}

fn cell_value(grid: Option<&Grid>, row: usize, column: usize) -> Option<String> {
    grid?
        .get(row.checked_sub(1)?)?
        .get(column.checked_sub(1)?)
        .cloned()
}

#[async_trait]
impl FleetStore for MemoryStore {
    async fn fetch_all(&self) -> Result<FleetSnapshot> {
        let grids = self.read()?;
        let records = |tab: &str| {
            grids
                .get(tab)
                .map(|g| records_from_grid(g))
                .unwrap_or_default()
        };

        Ok(FleetSnapshot::from_rows(
            records(&self.tables.pilots),
            records(&self.tables.drones),
            records(&self.tables.missions),
        ))
    }

    async fn update_pilot_status(&self, pilot_id: &str, new_status: &str) -> Result<StatusUpdate> {
        let mut grids = self.write()?;
        let grid = grids.entry(self.tables.pilots.clone()).or_default();

        let ids: Vec<String> = grid
            .iter()
            .map(|r| r.get(ID_COLUMN - 1).cloned().unwrap_or_default())
            .collect();

        let Some(row) = locate_row(&ids, pilot_id) else {
            return Ok(StatusUpdate::NotFound {
                pilot_id: pilot_id.to_string(),
            });
        };

        let cells = &mut grid[row - 1];
        if cells.len() < STATUS_COLUMN {
            cells.resize(STATUS_COLUMN, String::new());
        }
        cells[STATUS_COLUMN - 1] = new_status.to_string();
        info!("Updated {} status to '{}' at row {}", pilot_id, new_status, row);

        let grid = Some(&*grid);
        Ok(StatusUpdate::Verified {
            pilot_id: pilot_id.to_string(),
            name: cell_value(grid, row, NAME_COLUMN).unwrap_or_default(),
            status: cell_value(grid, row, STATUS_COLUMN).unwrap_or_default(),
            row,
        })
    }

    async fn describe(&self) -> Result<StoreInfo> {
        let grids = self.read()?;
        let mut tabs: Vec<String> = grids.keys().cloned().collect();
        tabs.sort();
        Ok(StoreInfo {
            title: self.title.clone(),
            tabs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Status;
    use crate::store::VERIFICATION_TAG;
    use crate::testing::sample_store;

    #[tokio::test]
    async fn test_fetch_all() {
        let store = sample_store();
        let snapshot = store.fetch_all().await.unwrap();

        assert_eq!(snapshot.pilots.len(), 2);
        assert_eq!(snapshot.drones.len(), 2);
        assert_eq!(snapshot.missions.len(), 2);
        assert_eq!(snapshot.pilots[0].name, "Arjun");
        assert_eq!(snapshot.drones[1].status, Status::Maintenance);
        assert_eq!(
            snapshot.missions[0].extra.get("client").map(String::as_str),
            Some("Client A")
        );
    }

    #[tokio::test]
    async fn test_update_writes_status_column() {
        let store = sample_store();
        let result = store.update_pilot_status("P001", "On Leave").await.unwrap();

        assert_eq!(
            store.cell("pilot_roster", 2, STATUS_COLUMN).unwrap().as_deref(),
            Some("On Leave")
        );

        let message = result.to_string();
        assert!(message.contains("Arjun"));
        assert!(message.contains("On Leave"));
        assert!(message.contains(VERIFICATION_TAG));
        assert!(message.contains("row 2"));

        let snapshot = store.fetch_all().await.unwrap();
        assert_eq!(snapshot.pilots[0].status, Status::OnLeave);
    }

    #[tokio::test]
    async fn test_update_unknown_pilot_writes_nothing() {
        let store = sample_store();
        let before = store.grid("pilot_roster").unwrap();

        let result = store.update_pilot_status("P999", "On Leave").await.unwrap();

        assert_eq!(
            result,
            StatusUpdate::NotFound {
                pilot_id: "P999".to_string()
            }
        );
        assert_eq!(store.grid("pilot_roster").unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_pads_short_rows() {
        let store = MemoryStore::new(
            TableNames::default(),
            vec![
                vec!["pilot_id".to_string(), "name".to_string()],
                vec!["P010".to_string(), "Kiran".to_string()],
            ],
            Vec::new(),
            Vec::new(),
        );

        let result = store.update_pilot_status("P010", "Assigned").await.unwrap();
        assert!(result.is_verified());
        assert_eq!(
            store.cell("pilot_roster", 2, 6).unwrap().as_deref(),
            Some("Assigned")
        );
    }

    #[tokio::test]
    async fn test_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");
        std::fs::write(
            &path,
            r#"{
                "title": "Skylark Ops",
                "pilots": [["pilot_id", "name"], ["P001", "Arjun"]],
                "drones": [["drone_id", "status", "current_assignment"], ["D001", "Maintenance", "PRJ009"]]
            }"#,
        )
        .unwrap();

        let store = MemoryStore::from_fixture(&path, TableNames::default()).unwrap();
        let info = store.describe().await.unwrap();
        assert_eq!(info.title, "Skylark Ops");
        assert_eq!(info.tabs, vec!["drone_fleet", "missions", "pilot_roster"]);

        let snapshot = store.fetch_all().await.unwrap();
        assert_eq!(snapshot.pilots[0].pilot_id, "P001");
        assert!(snapshot.missions.is_empty());
    }
}
