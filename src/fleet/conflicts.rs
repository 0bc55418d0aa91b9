//! Cross-table conflict checks.
//!
//! Each rule is a separate pass so the active rule set can be narrowed
//! without touching the others.

use super::{is_assigned, FleetSnapshot, Mission, Pilot, Status};
use serde::Serialize;

/// Rendered when no rule fires.
pub const NO_CONFLICTS: &str = "Health Check: No conflicts detected.";

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// Drone flagged for maintenance still carries an assignment.
    MaintenanceAssignment { drone_id: String, assignment: String },
    /// Assigned pilot is not where the mission is.
    LocationMismatch {
        pilot_id: String,
        pilot_name: String,
        pilot_location: String,
        project_id: String,
        mission_location: String,
    },
    /// Assigned pilot's skills do not contain the mission requirement.
    SkillGap {
        pilot_id: String,
        pilot_name: String,
        required: String,
        project_id: String,
    },
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conflict::MaintenanceAssignment {
                drone_id,
                assignment,
            } => write!(
                f,
                "Drone {} is in Maintenance but assigned to {}",
                drone_id, assignment
            ),
            Conflict::LocationMismatch {
                pilot_id,
                pilot_name,
                pilot_location,
                project_id,
                mission_location,
            } => write!(
                f,
                "Pilot {} ({}) is in {} but mission {} is in {}",
                pilot_id, pilot_name, pilot_location, project_id, mission_location
            ),
            Conflict::SkillGap {
                pilot_id,
                pilot_name,
                required,
                project_id,
            } => write!(
                f,
                "Pilot {} ({}) lacks required skill '{}' for mission {}",
                pilot_id, pilot_name, required, project_id
            ),
        }
    }
}

/// Findings for one snapshot, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_clear(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl std::fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "{}", NO_CONFLICTS);
        }
        let lines: Vec<String> = self.conflicts.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Run every rule over the snapshot.
pub fn detect_conflicts(snapshot: &FleetSnapshot) -> ConflictReport {
    let mut conflicts = maintenance_conflicts(snapshot);

    for mission in &snapshot.missions {
        if let Some(pilot) = snapshot.pilot_for(&mission.project_id) {
            conflicts.extend(location_mismatch(pilot, mission));
            conflicts.extend(skill_gap(pilot, mission));
        }
    }

    ConflictReport { conflicts }
}

fn maintenance_conflicts(snapshot: &FleetSnapshot) -> Vec<Conflict> {
    snapshot
        .drones
        .iter()
        .filter(|d| d.status == Status::Maintenance && is_assigned(&d.current_assignment))
        .map(|d| Conflict::MaintenanceAssignment {
            drone_id: d.drone_id.clone(),
            assignment: d.current_assignment.trim().to_string(),
        })
        .collect()
}

fn location_mismatch(pilot: &Pilot, mission: &Mission) -> Option<Conflict> {
    if pilot.location.trim() == mission.location.trim() {
        return None;
    }
    Some(Conflict::LocationMismatch {
        pilot_id: pilot.pilot_id.clone(),
        pilot_name: pilot.name.clone(),
        pilot_location: pilot.location.clone(),
        project_id: mission.project_id.clone(),
        mission_location: mission.location.clone(),
    })
}

// Substring containment against the joined skill string. A required value of
// "Map" passes for a pilot listing "Mapping".
fn skill_gap(pilot: &Pilot, mission: &Mission) -> Option<Conflict> {
    let required = mission.required_skills.trim();
    if required.is_empty() || pilot.skills.contains(required) {
        return None;
    }
    Some(Conflict::SkillGap {
        pilot_id: pilot.pilot_id.clone(),
        pilot_name: pilot.name.clone(),
        required: required.to_string(),
        project_id: mission.project_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Row;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pilot(id: &str, location: &str, skills: &str, assignment: &str) -> Row {
        let name = format!("Pilot {}", id);
        row(&[
            ("pilot_id", id),
            ("name", name.as_str()),
            ("location", location),
            ("skills", skills),
            ("current_assignment", assignment),
            ("status", "Assigned"),
        ])
    }

    fn drone(id: &str, status: &str, assignment: &str) -> Row {
        row(&[
            ("drone_id", id),
            ("status", status),
            ("current_assignment", assignment),
        ])
    }

    fn mission(id: &str, location: &str, skill: &str) -> Row {
        row(&[
            ("project_id", id),
            ("location", location),
            ("required_skills", skill),
        ])
    }

    fn healthy_snapshot() -> FleetSnapshot {
        FleetSnapshot::from_rows(
            vec![
                pilot("P001", "Bangalore", "Mapping, Survey", "PRJ001"),
                pilot("P002", "Mumbai", "Thermal", "None"),
            ],
            vec![
                drone("D001", "Available", "PRJ001"),
                drone("D002", "Maintenance", "\u{2013}"),
                drone("D003", "Maintenance", ""),
            ],
            vec![
                mission("PRJ001", "Bangalore", "Mapping"),
                mission("PRJ002", "Mumbai", "Thermal"),
            ],
        )
    }

    #[test]
    fn test_clean_snapshot_reports_no_conflicts() {
        let report = detect_conflicts(&healthy_snapshot());
        assert!(report.is_clear());
        assert_eq!(report.to_string(), NO_CONFLICTS);
    }

    #[test]
    fn test_maintenance_drone_with_assignment() {
        let mut snapshot = healthy_snapshot();
        snapshot
            .drones
            .push(crate::fleet::Drone::from_row(drone("D004", "Maintenance", "MissionX")));

        let report = detect_conflicts(&snapshot);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(
            report.conflicts[0],
            Conflict::MaintenanceAssignment {
                drone_id: "D004".to_string(),
                assignment: "MissionX".to_string(),
            }
        );
        assert_eq!(
            report.to_string(),
            "Drone D004 is in Maintenance but assigned to MissionX"
        );
    }

    #[test]
    fn test_location_mismatch_and_skill_gap() {
        let snapshot = FleetSnapshot::from_rows(
            vec![pilot("P001", "Pune", "Survey", "PRJ001")],
            vec![],
            vec![mission("PRJ001", "Bangalore", "Thermal")],
        );

        let lines: Vec<String> = detect_conflicts(&snapshot)
            .conflicts
            .iter()
            .map(|c| c.to_string())
            .collect();

        assert_eq!(
            lines,
            vec![
                "Pilot P001 (Pilot P001) is in Pune but mission PRJ001 is in Bangalore".to_string(),
                "Pilot P001 (Pilot P001) lacks required skill 'Thermal' for mission PRJ001"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_only_first_assigned_pilot_is_checked() {
        let snapshot = FleetSnapshot::from_rows(
            vec![
                pilot("P001", "Bangalore", "Mapping", "PRJ001"),
                pilot("P002", "Delhi", "Nothing", "PRJ001"),
            ],
            vec![],
            vec![mission("PRJ001", "Bangalore", "Mapping")],
        );

        assert!(detect_conflicts(&snapshot).is_clear());
    }

    #[test]
    fn test_skill_match_is_substring() {
        let snapshot = FleetSnapshot::from_rows(
            vec![pilot("P001", "Bangalore", "Mapping", "PRJ001")],
            vec![],
            vec![mission("PRJ001", "Bangalore", "Map")],
        );

        assert!(detect_conflicts(&snapshot).is_clear());
    }

    #[test]
    fn test_unmatched_assignment_finds_nothing() {
        let snapshot = FleetSnapshot::from_rows(
            vec![pilot("P001", "Pune", "Survey", "PRJ999")],
            vec![],
            vec![mission("PRJ001", "Bangalore", "Thermal")],
        );

        assert!(detect_conflicts(&snapshot).is_clear());
    }

    #[test]
    fn test_detection_is_repeatable() {
        let mut snapshot = healthy_snapshot();
        snapshot
            .drones
            .push(crate::fleet::Drone::from_row(drone("D009", "Maintenance", "PRJ002")));
        snapshot.pilots[0].location = "Chennai".to_string();

        let first = detect_conflicts(&snapshot);
        let second = detect_conflicts(&snapshot);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(first.conflicts.len(), 2);
    }
}
