//! Fleet data model: pilots, drones and missions as read from the sheet.
//!
//! Rows arrive as header -> value maps. The columns the coordinator reasons
//! about are lifted into typed fields; every other column is kept in `extra`
//! so snapshots round-trip to the agent unfiltered.

mod conflicts;

pub use conflicts::{detect_conflicts, Conflict, ConflictReport, NO_CONFLICTS};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single sheet row keyed by column header.
pub type Row = BTreeMap<String, String>;

/// Assignment values that mean "not assigned".
///
/// Includes the en dash as it appears after a UTF-8/CP1252 round trip.
pub const EMPTY_ASSIGNMENTS: [&str; 5] = ["", "None", "\u{2013}", "\u{2014}", "\u{e2}\u{20ac}\u{201c}"];

/// Whether an assignment field holds a real mission identifier.
pub fn is_assigned(value: &str) -> bool {
    !EMPTY_ASSIGNMENTS.contains(&value.trim())
}

/// Status value of a pilot or drone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Available,
    OnLeave,
    Assigned,
    Maintenance,
    /// Any value the sheet holds that is not one of the above.
    Other(String),
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Available" => Status::Available,
            "On Leave" => Status::OnLeave,
            "Assigned" => Status::Assigned,
            "Maintenance" => Status::Maintenance,
            _ => Status::Other(value),
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::from(value.to_string())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Available => write!(f, "Available"),
            Status::OnLeave => write!(f, "On Leave"),
            Status::Assigned => write!(f, "Assigned"),
            Status::Maintenance => write!(f, "Maintenance"),
            Status::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A row of the pilot roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub pilot_id: String,
    pub name: String,
    pub location: String,
    /// Comma-joined skill list as stored in the sheet.
    pub skills: String,
    pub current_assignment: String,
    pub status: Status,
    #[serde(flatten)]
    pub extra: Row,
}

impl Pilot {
    pub fn from_row(mut row: Row) -> Self {
        Self {
            pilot_id: take(&mut row, "pilot_id"),
            name: take(&mut row, "name"),
            location: take(&mut row, "location"),
            skills: take(&mut row, "skills"),
            current_assignment: take(&mut row, "current_assignment"),
            status: Status::from(take(&mut row, "status")),
            extra: row,
        }
    }

    /// Individual skills, trimmed.
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_assigned_to(&self, project_id: &str) -> bool {
        is_assigned(&self.current_assignment) && self.current_assignment.trim() == project_id.trim()
    }
}

/// A row of the drone fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub drone_id: String,
    pub status: Status,
    pub current_assignment: String,
    #[serde(flatten)]
    pub extra: Row,
}

impl Drone {
    pub fn from_row(mut row: Row) -> Self {
        Self {
            drone_id: take(&mut row, "drone_id"),
            status: Status::from(take(&mut row, "status")),
            current_assignment: take(&mut row, "current_assignment"),
            extra: row,
        }
    }
}

/// A row of the missions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub project_id: String,
    pub location: String,
    pub required_skills: String,
    #[serde(flatten)]
    pub extra: Row,
}

impl Mission {
    pub fn from_row(mut row: Row) -> Self {
        Self {
            project_id: take(&mut row, "project_id"),
            location: take(&mut row, "location"),
            required_skills: take(&mut row, "required_skills"),
            extra: row,
        }
    }
}

/// Full read of the three tables at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub pilots: Vec<Pilot>,
    pub drones: Vec<Drone>,
    pub missions: Vec<Mission>,
}

impl FleetSnapshot {
    pub fn from_rows(pilots: Vec<Row>, drones: Vec<Row>, missions: Vec<Row>) -> Self {
        Self {
            pilots: pilots.into_iter().map(Pilot::from_row).collect(),
            drones: drones.into_iter().map(Drone::from_row).collect(),
            missions: missions.into_iter().map(Mission::from_row).collect(),
        }
    }

    /// First pilot whose assignment matches the mission.
    pub fn pilot_for(&self, project_id: &str) -> Option<&Pilot> {
        self.pilots.iter().find(|p| p.is_assigned_to(project_id))
    }
}

fn take(row: &mut Row, key: &str) -> String {
    row.remove(key).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_assignment_sentinels() {
        assert!(!is_assigned(""));
        assert!(!is_assigned("None"));
        assert!(!is_assigned("\u{2013}"));
        assert!(!is_assigned(" \u{2014} "));
        assert!(!is_assigned("\u{e2}\u{20ac}\u{201c}"));
        assert!(is_assigned("PRJ001"));
        assert!(is_assigned("none"));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(Status::from("On Leave"), Status::OnLeave);
        assert_eq!(Status::from("Maintenance"), Status::Maintenance);
        assert_eq!(
            Status::from("Grounded"),
            Status::Other("Grounded".to_string())
        );
        assert_eq!(Status::from("Grounded").to_string(), "Grounded");
        assert_eq!(Status::OnLeave.to_string(), "On Leave");
    }

    #[test]
    fn test_status_requires_exact_value() {
        assert_eq!(
            Status::from(" Maintenance "),
            Status::Other(" Maintenance ".to_string())
        );
        assert_eq!(
            Status::from("maintenance"),
            Status::Other("maintenance".to_string())
        );
    }

    #[test]
    fn test_pilot_keeps_extra_columns() {
        let pilot = Pilot::from_row(row(&[
            ("pilot_id", "P001"),
            ("name", "Arjun"),
            ("skills", "Mapping, Thermal"),
            ("status", "Available"),
            ("certifications", "DGCA"),
        ]));

        assert_eq!(pilot.pilot_id, "P001");
        assert_eq!(pilot.location, "");
        assert_eq!(pilot.skill_list(), vec!["Mapping", "Thermal"]);
        assert_eq!(pilot.extra.get("certifications").map(String::as_str), Some("DGCA"));

        let json = serde_json::to_value(&pilot).unwrap();
        assert_eq!(json["certifications"], "DGCA");
        assert_eq!(json["status"], "Available");
    }

    #[test]
    fn test_pilot_for_skips_unassigned() {
        let snapshot = FleetSnapshot::from_rows(
            vec![
                row(&[("pilot_id", "P001"), ("current_assignment", "None")]),
                row(&[("pilot_id", "P002"), ("current_assignment", "PRJ001")]),
                row(&[("pilot_id", "P003"), ("current_assignment", "PRJ001")]),
            ],
            vec![],
            vec![row(&[("project_id", "PRJ001")])],
        );

        assert_eq!(snapshot.pilot_for("PRJ001").unwrap().pilot_id, "P002");
        assert!(snapshot.pilot_for("PRJ404").is_none());
        assert!(snapshot.pilot_for("None").is_none());
    }
}
