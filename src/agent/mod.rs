//! Flight coordinator agent.
//!
//! A chat session backed by a hosted model that can call the fleet tools.
//! Replies are validated against what the tools returned before they reach
//! the transcript.

mod guard;
mod model;
mod session;
mod tools;

pub use guard::{inspect_reply, unexecuted_call, ReplyIssue};
pub use model::{ChatModel, ModelReply, OpenAiChatModel};
pub use session::{
    ChatSession, Role, SessionOptions, ToolCallRecord, TranscriptEntry, TurnOutcome,
};
pub use tools::{
    parse_tool_call, parse_tool_value, tool_definitions, tool_specs, FleetTool, ToolContext,
    ToolSpec, TOOL_NAMES,
};
