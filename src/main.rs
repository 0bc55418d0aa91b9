//! Skylark CLI entry point.

use anyhow::Result;
use clap::Parser;
use skylark::cli::{commands, Cli, Commands};
use skylark::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries command output (and MCP JSON-RPC), so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("skylark={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let api_key = cli.api_key.as_deref();

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings, api_key, &config_path)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, api_key, &config_path).await?;
        }

        Commands::Chat { model } => {
            commands::run_chat(model.clone(), api_key, settings).await?;
        }

        Commands::Ask {
            command,
            model,
            show_tools,
        } => {
            commands::run_ask(command, model.clone(), *show_tools, api_key, settings).await?;
        }

        Commands::Data { json } => {
            commands::run_data(*json, settings).await?;
        }

        Commands::Conflicts => {
            commands::run_conflicts(settings).await?;
        }

        Commands::Status {
            pilot_id,
            new_status,
        } => {
            commands::run_status(pilot_id, new_status, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, api_key, settings).await?;
        }

        Commands::Mcp => {
            commands::run_mcp(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
