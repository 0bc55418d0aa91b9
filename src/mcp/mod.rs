//! MCP (Model Context Protocol) server for Skylark.
//!
//! Exposes the fleet tools to other agents.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
