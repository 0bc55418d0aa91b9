//! CLI output formatting utilities.

use crate::agent::ToolCallRecord;
use crate::fleet::FleetSnapshot;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print the coordinator's reply.
    pub fn reply(text: &str) {
        println!("\n{} {}\n", style("Skylark:").cyan().bold(), text);
    }

    /// Print one tool call made during a turn.
    pub fn tool_call(record: &ToolCallRecord) {
        let mark = if record.succeeded {
            style("ok").green()
        } else {
            style("failed").red()
        };
        println!("  {} {}", style(format!("[{}]", record)).dim(), mark);
    }

    /// Print pilots, drones and missions as aligned lists.
    pub fn snapshot(snapshot: &FleetSnapshot) {
        Output::header(&format!("Pilots ({})", snapshot.pilots.len()));
        for p in &snapshot.pilots {
            println!(
                "  {} {} {} [{}] {} -> {}",
                style("*").cyan(),
                style(&p.pilot_id).bold(),
                p.name,
                p.skills,
                style(&p.location).dim(),
                assignment(&p.current_assignment),
            );
            println!("      status: {}", p.status);
        }

        Output::header(&format!("Drones ({})", snapshot.drones.len()));
        for d in &snapshot.drones {
            println!(
                "  {} {} {} -> {}",
                style("*").cyan(),
                style(&d.drone_id).bold(),
                d.status,
                assignment(&d.current_assignment),
            );
        }

        Output::header(&format!("Missions ({})", snapshot.missions.len()));
        for m in &snapshot.missions {
            println!(
                "  {} {} {} needs '{}'",
                style("*").cyan(),
                style(&m.project_id).bold(),
                style(&m.location).dim(),
                m.required_skills,
            );
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn assignment(value: &str) -> String {
    if crate::fleet::is_assigned(value) {
        value.trim().to_string()
    } else {
        style("unassigned").dim().to_string()
    }
}
