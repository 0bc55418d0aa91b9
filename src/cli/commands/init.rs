//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::openai::{ApiKey, API_KEY_ENV_VARS};
use crate::store::ServiceAccountKey;
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, api_key: Option<&str>, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Skylark Setup");
    println!();
    println!("Let's connect Skylark to your fleet spreadsheet.\n");

    let mut settings = settings.clone();

    // Step 1: Spreadsheet
    println!("{}", style("Step 1: Spreadsheet").bold().cyan());
    println!();
    println!("  The spreadsheet id is the long key in the sheet URL:");
    println!(
        "  {}",
        style("https://docs.google.com/spreadsheets/d/<id>/edit").dim()
    );
    println!();

    let id = prompt_value("Spreadsheet id", &settings.sheets.spreadsheet_id)?;
    settings.sheets.spreadsheet_id = id;

    println!();

    // Step 2: Service account
    println!("{}", style("Step 2: Service account").bold().cyan());
    println!();

    let key_file = prompt_value("Service account key file", &settings.sheets.service_account_file)?;
    settings.sheets.service_account_file = key_file;

    match ServiceAccountKey::from_file(&settings.service_account_path()) {
        Ok(key) => {
            Output::success(&format!("Service account: {}", key.client_email));
            println!(
                "  Share the spreadsheet with {} (Editor access).",
                style(&key.client_email).green()
            );
        }
        Err(e) => {
            Output::warning(&format!("{}", e));
            println!("  Download a JSON key from the Google Cloud console and place it at that path.");
        }
    }

    println!();

    // Step 3: API key
    println!("{}", style("Step 3: Model API key").bold().cyan());
    println!();

    if ApiKey::resolve(api_key).is_some() {
        Output::success("Model API key is configured!");
    } else {
        Output::warning("No model API key found.");
        println!();
        println!("  The key is read from the environment and never stored in the config file.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style(format!("export {}='...'", API_KEY_ENV_VARS[0])).green());
    }

    println!();

    // Step 4: Config file
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let write = if config_path.exists() {
        prompt_continue(&format!("Overwrite {}?", config_path.display()))?
    } else {
        true
    };

    if write {
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Saved config file: {}", config_path.display()));
    } else {
        Output::info("Kept the existing config file.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check the connection", style("skylark doctor").cyan());
    println!("  {} Look for conflicts", style("skylark conflicts").cyan());
    println!("  {} Talk to the coordinator", style("skylark chat").cyan());
    println!();

    Ok(())
}

/// Prompt for a value, keeping the current one on empty input.
fn prompt_value(label: &str, current: &str) -> io::Result<String> {
    if current.is_empty() {
        print!("{} {}: ", style("?").cyan(), label);
    } else {
        print!("{} {} {}: ", style("?").cyan(), label, style(format!("[{}]", current)).dim());
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(keep_or_replace(current, &input))
}

fn keep_or_replace(current: &str, input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        current.to_string()
    } else {
        input.to_string()
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
