//! CLI module for Skylark.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Skylark - drone fleet coordination
///
/// Chat with a flight coordinator that reads and updates the pilot roster,
/// drone fleet and missions kept in a Google spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "skylark")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Model API key (never written to the config file)
    #[arg(long, global = true, env = "SKYLARK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a configuration file
    Init,

    /// Check configuration, credentials and the spreadsheet connection
    Doctor,

    /// Start an interactive session with the flight coordinator
    Chat {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Send a single command to the flight coordinator
    Ask {
        /// The command, e.g. "Update P001 to On Leave"
        command: String,

        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Print the tool calls made during the turn
        #[arg(long)]
        show_tools: bool,
    },

    /// Print pilots, drones and missions
    Data {
        /// Print raw JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Run the conflict checks without the model
    Conflicts,

    /// Update a pilot's status without the model
    Status {
        /// Pilot ID, e.g. P001
        pilot_id: String,

        /// New status, e.g. "On Leave"
        new_status: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start MCP server exposing the fleet tools over stdio
    Mcp,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["skylark", "status", "P001", "On Leave"]).unwrap();
        match cli.command {
            Commands::Status {
                pilot_id,
                new_status,
            } => {
                assert_eq!(pilot_id, "P001");
                assert_eq!(new_status, "On Leave");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["skylark", "conflicts", "-vv", "--api-key", "k"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }
}
