//! Conversational session with tool calling, reply validation and retry.

use super::guard::inspect_reply;
use super::model::ChatModel;
use super::tools::{parse_tool_call, tool_definitions, ToolContext};
use crate::config::{AgentSettings, Prompts};
use crate::error::{Result, SkylarkError};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool,
};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Limits applied to each turn.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Attempts per turn before the error is surfaced.
    pub max_attempts: usize,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Model round trips allowed while resolving tool calls.
    pub max_tool_iterations: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&AgentSettings::default())
    }
}

impl From<&AgentSettings> for SessionOptions {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
            max_tool_iterations: settings.max_tool_iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One visible line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

/// Record of a tool call made during a turn.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned to the model.
    pub result: String,
    /// False when the call could not be parsed or the tool errored.
    pub succeeded: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}

/// Result of one accepted turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    /// Text appended to the transcript.
    pub reply: String,
    /// Tool calls made by the successful attempt.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Attempt that produced the reply (1-based).
    pub attempts: usize,
    /// Whether the first reply was rejected and a correction was requested.
    pub corrected: bool,
}

/// A conversation with the flight coordinator.
///
/// The visible transcript and the model conversation live as long as the
/// session. The system message and tool catalog are built on first use.
pub struct ChatSession {
    model: Box<dyn ChatModel>,
    tools: ToolContext,
    prompts: Prompts,
    options: SessionOptions,
    transcript: Vec<TranscriptEntry>,
    messages: Vec<ChatCompletionRequestMessage>,
    catalog: Option<Vec<ChatCompletionTool>>,
}

impl ChatSession {
    pub fn new(
        model: Box<dyn ChatModel>,
        tools: ToolContext,
        prompts: Prompts,
        options: SessionOptions,
    ) -> Self {
        Self {
            model,
            tools,
            prompts,
            options,
            transcript: Vec::new(),
            messages: Vec::new(),
            catalog: None,
        }
    }

    /// Visible conversation so far.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Forget the conversation and the cached tool catalog.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.messages.clear();
        self.catalog = None;
        info!("Session reset");
    }

    /// Send a user message and return the accepted reply.
    ///
    /// The user message is always recorded in the transcript. The reply is
    /// appended only when an attempt succeeds.
    pub async fn send(&mut self, input: &str) -> Result<TurnOutcome> {
        self.transcript.push(TranscriptEntry {
            role: Role::User,
            content: input.to_string(),
        });

        self.ensure_system_message()?;
        let tools = self.catalog().to_vec();
        let max_attempts = self.options.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let checkpoint = self.messages.len();
            match self.attempt(input, &tools).await {
                Ok(mut outcome) => {
                    outcome.attempts = attempt;
                    self.transcript.push(TranscriptEntry {
                        role: Role::Assistant,
                        content: outcome.reply.clone(),
                    });
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!("Attempt {}/{} failed: {}", attempt, max_attempts, e);
                    self.messages.truncate(checkpoint);
                    last_error = Some(e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SkylarkError::Agent("No attempt was made".to_string())))
    }

    fn ensure_system_message(&mut self) -> Result<()> {
        if self.messages.is_empty() {
            let system = ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system_prompt())
                .build()
                .map_err(|e| SkylarkError::Agent(e.to_string()))?;
            self.messages.push(system.into());
        }
        Ok(())
    }

    fn catalog(&mut self) -> &[ChatCompletionTool] {
        self.catalog.get_or_insert_with(tool_definitions)
    }

    /// One full dispatch: tool loop, validation, and at most one correction.
    async fn attempt(&mut self, input: &str, tools: &[ChatCompletionTool]) -> Result<TurnOutcome> {
        self.push_user(input)?;

        let mut calls = Vec::new();
        let reply = self.resolve(tools, &mut calls).await?;

        let Some(issue) = inspect_reply(&reply, &calls) else {
            return Ok(TurnOutcome {
                reply,
                tool_calls: calls,
                attempts: 1,
                corrected: false,
            });
        };

        warn!("Reply rejected ({}), requesting correction", issue);
        let corrective = self.prompts.corrective_prompt();
        self.push_user(&corrective)?;
        let reply = self.resolve(tools, &mut calls).await?;

        Ok(TurnOutcome {
            reply,
            tool_calls: calls,
            attempts: 1,
            corrected: true,
        })
    }

    /// Call the model until it answers with text, running requested tools.
    async fn resolve(
        &mut self,
        tools: &[ChatCompletionTool],
        calls: &mut Vec<ToolCallRecord>,
    ) -> Result<String> {
        for iteration in 1..=self.options.max_tool_iterations {
            debug!("Model round trip {}, {} messages", iteration, self.messages.len());

            let reply = self.model.complete(&self.messages, tools).await?;

            if reply.tool_calls.is_empty() {
                let content = reply.content.unwrap_or_default();
                let message = ChatCompletionRequestAssistantMessageArgs::default()
                    .content(content.clone())
                    .build()
                    .map_err(|e| SkylarkError::Agent(e.to_string()))?;
                self.messages.push(message.into());
                return Ok(content);
            }

            let mut message = ChatCompletionRequestAssistantMessageArgs::default();
            message.tool_calls(reply.tool_calls.clone());
            if let Some(content) = reply.content.filter(|c| !c.trim().is_empty()) {
                message.content(content);
            }
            let message = message
                .build()
                .map_err(|e| SkylarkError::Agent(e.to_string()))?;
            self.messages.push(message.into());

            for tool_call in &reply.tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                let tool_message = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| SkylarkError::Agent(e.to_string()))?;
                self.messages.push(tool_message.into());

                calls.push(record);
            }
        }

        Err(SkylarkError::Agent(format!(
            "Too many tool iterations ({})",
            self.options.max_tool_iterations
        )))
    }

    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Calling tool: {} with args: {}", name, arguments);

        let (result, succeeded) = match parse_tool_call(name, arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(output) => (output, true),
                Err(e) => (format!("Tool error: {}", e), false),
            },
            Err(e) => (format!("Failed to parse tool call: {}", e), false),
        };

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result,
            succeeded,
        }
    }

    fn push_user(&mut self, content: &str) -> Result<()> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| SkylarkError::Agent(e.to_string()))?;
        self.messages.push(message.into());
        Ok(())
    }
}
