//! Shared fixtures for unit tests.

use crate::agent::{ChatModel, ModelReply};
use crate::error::{Result, SkylarkError};
use crate::store::{MemoryStore, TableNames};
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionTool, ChatCompletionToolType,
    FunctionCall,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// Two pilots, two drones (one in maintenance) and two missions.
pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new(
        TableNames::default(),
        grid(&[
            &["pilot_id", "name", "skills", "location", "current_assignment", "status"],
            &["P001", "Arjun", "Mapping, Survey", "Bangalore", "PRJ001", "Available"],
            &["P002", "Neha", "Thermal", "Mumbai", "\u{2013}", "Available"],
        ]),
        grid(&[
            &["drone_id", "model", "status", "current_assignment"],
            &["D001", "DJI M300", "Available", "PRJ001"],
            &["D002", "DJI Mavic 3", "Maintenance", "PRJ002"],
        ]),
        grid(&[
            &["project_id", "client", "location", "required_skills"],
            &["PRJ001", "Client A", "Bangalore", "Mapping"],
            &["PRJ002", "Client B", "Mumbai", "Thermal"],
        ]),
    )
}

/// One scripted model response.
pub(crate) enum Step {
    Reply(ModelReply),
    Fail(String),
}

impl Step {
    pub(crate) fn text(content: &str) -> Self {
        Step::Reply(ModelReply {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        })
    }

    pub(crate) fn call(id: &str, name: &str, arguments: &str) -> Self {
        Step::Reply(ModelReply {
            content: None,
            tool_calls: vec![ChatCompletionMessageToolCall {
                id: id.to_string(),
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: arguments.to_string(),
                },
            }],
        })
    }

    pub(crate) fn fail(message: &str) -> Self {
        Step::Fail(message.to_string())
    }
}

#[derive(Default)]
struct Script {
    steps: VecDeque<Step>,
    requests: Vec<Vec<ChatCompletionRequestMessage>>,
}

/// Chat model that plays back a fixed script and records every request.
#[derive(Clone, Default)]
pub(crate) struct ScriptedModel {
    script: Arc<Mutex<Script>>,
}

impl ScriptedModel {
    pub(crate) fn new(steps: Vec<Step>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                steps: steps.into(),
                requests: Vec::new(),
            })),
        }
    }

    pub(crate) fn requests(&self) -> Vec<Vec<ChatCompletionRequestMessage>> {
        self.script.lock().unwrap().requests.clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.script.lock().unwrap().requests.len()
    }

    /// Text of the user messages in the most recent request.
    pub(crate) fn user_texts(&self) -> Vec<String> {
        let requests = self.requests();
        let Some(last) = requests.last() else {
            return Vec::new();
        };
        last.iter()
            .filter_map(|message| match message {
                ChatCompletionRequestMessage::User(user) => match &user.content {
                    ChatCompletionRequestUserMessageContent::Text(text) => Some(text.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        _tools: &[ChatCompletionTool],
    ) -> Result<ModelReply> {
        let mut script = self.script.lock().unwrap();
        script.requests.push(messages.to_vec());
        match script.steps.pop_front() {
            Some(Step::Reply(reply)) => Ok(reply),
            Some(Step::Fail(message)) => Err(SkylarkError::Model(message)),
            None => Err(SkylarkError::Model("script exhausted".to_string())),
        }
    }
}
