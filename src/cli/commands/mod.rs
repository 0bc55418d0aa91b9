//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod data;
mod doctor;
mod init;
mod mcp;
mod serve;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use data::{run_conflicts, run_data, run_status};
pub use doctor::run_doctor;
pub use init::run_init;
pub use mcp::run_mcp;
pub use serve::run_serve;
