//! Ask command implementation.

use super::chat::start_session;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run a single turn against the coordinator.
pub async fn run_ask(
    command: &str,
    model: Option<String>,
    show_tools: bool,
    api_key: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let mut chat = match start_session(model, api_key, settings) {
        Ok(session) => session,
        Err(e) => {
            Output::error(&format!("{}", e));
            Output::info("Run 'skylark doctor' for detailed diagnostics.");
            return Err(e);
        }
    };

    let spinner = Output::spinner("Coordinating...");
    let result = chat.send(command).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            if show_tools {
                for record in &outcome.tool_calls {
                    Output::tool_call(record);
                }
            }
            println!("\n{}\n", outcome.reply);
        }
        Err(e) => {
            Output::error(&format!("Request failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
