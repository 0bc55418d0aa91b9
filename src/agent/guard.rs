//! Validation of model replies before they reach the transcript.
//!
//! A reply is held back when it is empty, when it contains call syntax the
//! model wrote out instead of executing, or when it disagrees with what the
//! tools actually returned during the turn.

use super::session::ToolCallRecord;
use super::tools::TOOL_NAMES;
use crate::store::VERIFICATION_TAG;
use regex::Regex;
use std::sync::LazyLock;

static CALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let names = std::iter::once("print")
        .chain(TOOL_NAMES)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({})\(", names)).expect("call pattern is valid")
});

/// Why a reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyIssue {
    /// Nothing but whitespace.
    Empty,
    /// Text such as `update_pilot_status(` that was never executed.
    UnexecutedCall(String),
    /// An update was requested but no result carried the verification tag.
    UnverifiedUpdate,
    /// The reply quotes the verification tag no tool returned.
    UnbackedVerification,
}

impl std::fmt::Display for ReplyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplyIssue::Empty => write!(f, "empty reply"),
            ReplyIssue::UnexecutedCall(name) => write!(f, "unexecuted call to {}", name),
            ReplyIssue::UnverifiedUpdate => write!(f, "status update was never verified"),
            ReplyIssue::UnbackedVerification => {
                write!(f, "{} claimed without a tool result", VERIFICATION_TAG)
            }
        }
    }
}

/// Name of the first call-shaped expression in the text, if any.
pub fn unexecuted_call(text: &str) -> Option<String> {
    CALL_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check a reply against the tool calls made in the same turn.
pub fn inspect_reply(reply: &str, calls: &[ToolCallRecord]) -> Option<ReplyIssue> {
    if reply.trim().is_empty() {
        return Some(ReplyIssue::Empty);
    }

    if let Some(name) = unexecuted_call(reply) {
        return Some(ReplyIssue::UnexecutedCall(name));
    }

    let tag_observed = calls.iter().any(|c| c.result.contains(VERIFICATION_TAG));
    let updated = calls.iter().any(|c| c.name == "update_pilot_status");
    if updated && !tag_observed {
        return Some(ReplyIssue::UnverifiedUpdate);
    }

    if reply.contains(VERIFICATION_TAG) && !tag_observed {
        return Some(ReplyIssue::UnbackedVerification);
    }

    None
}
