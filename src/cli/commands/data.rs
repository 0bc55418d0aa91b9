//! Direct store commands: data, conflicts and status.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::store::StatusUpdate;
use anyhow::Result;

fn coordinator(settings: Settings) -> Result<Coordinator> {
    if let Err(e) = preflight::check(Operation::Store, &settings, None) {
        Output::error(&format!("{}", e));
        Output::info("Run 'skylark doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(Coordinator::new(settings)?)
}

/// Print the current pilots, drones and missions.
pub async fn run_data(json: bool, settings: Settings) -> Result<()> {
    let coordinator = coordinator(settings)?;

    let spinner = Output::spinner("Fetching fleet data...");
    let snapshot = coordinator.snapshot().await;
    spinner.finish_and_clear();
    let snapshot = snapshot?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        Output::snapshot(&snapshot);
    }
    Ok(())
}

/// Run the conflict checks and print every finding.
pub async fn run_conflicts(settings: Settings) -> Result<()> {
    let coordinator = coordinator(settings)?;

    let spinner = Output::spinner("Checking for conflicts...");
    let report = coordinator.conflicts().await;
    spinner.finish_and_clear();
    let report = report?;

    if report.is_clear() {
        Output::success(&report.to_string());
        return Ok(());
    }

    Output::header(&format!("{} conflicts", report.conflicts.len()));
    for conflict in &report.conflicts {
        Output::list_item(&conflict.to_string());
    }
    println!();
    Ok(())
}

/// Update one pilot's status without the model.
pub async fn run_status(pilot_id: &str, new_status: &str, settings: Settings) -> Result<()> {
    let coordinator = coordinator(settings)?;

    let spinner = Output::spinner(&format!("Updating {}...", pilot_id));
    let update = coordinator.update_pilot_status(pilot_id, new_status).await;
    spinner.finish_and_clear();

    match update? {
        update @ StatusUpdate::Verified { .. } => Output::success(&update.to_string()),
        update @ StatusUpdate::NotFound { .. } => {
            Output::error(&update.to_string());
            anyhow::bail!("pilot {} not found", pilot_id);
        }
    }
    Ok(())
}
