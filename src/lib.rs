//! Skylark - drone fleet coordination
//!
//! A conversational operations agent for a drone services company. The
//! pilot roster, drone fleet and missions live in three tabs of a Google
//! spreadsheet; a hosted chat model reads them, updates pilot status and
//! reports scheduling conflicts through a small set of tools.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `fleet` - Pilot, drone and mission records plus the conflict checks
//! - `store` - Spreadsheet access (Google Sheets or in-memory)
//! - `agent` - Tool catalog, reply validation and the chat session
//! - `coordinator` - Wiring shared by the CLI, HTTP API and MCP server
//! - `mcp` - MCP server exposing the fleet tools over stdio
//!
//! # Example
//!
//! ```rust,no_run
//! use skylark::config::Settings;
//! use skylark::coordinator::Coordinator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let coordinator = Coordinator::new(settings)?;
//!
//!     let report = coordinator.conflicts().await?;
//!     println!("{}", report);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fleet;
pub mod mcp;
pub mod openai;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, SkylarkError};
