//! Hosted chat model behind a narrow trait.

use crate::config::AgentSettings;
use crate::error::{Result, SkylarkError};
use crate::openai::{create_client, ApiKey};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestMessage, ChatCompletionTool,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

/// What the model sent back for one request.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ChatCompletionMessageToolCall>,
}

/// A chat model that can request tool calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelReply>;
}

/// Chat model reached through an OpenAI-compatible endpoint.
///
/// The HTTP client is built on the first request and reused afterwards.
pub struct OpenAiChatModel {
    api_key: ApiKey,
    api_base: String,
    model: String,
    timeout: Duration,
    client: OnceCell<Client<OpenAIConfig>>,
}

impl OpenAiChatModel {
    pub fn new(api_key: ApiKey, settings: &AgentSettings) -> Self {
        Self {
            api_key,
            api_base: settings.api_base.clone(),
            model: settings.model.clone(),
            timeout: Duration::from_secs(settings.request_timeout_secs),
            client: OnceCell::new(),
        }
    }

    /// Override the model name.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn client(&self) -> Result<&Client<OpenAIConfig>> {
        self.client
            .get_or_try_init(|| async {
                create_client(&self.api_key, &self.api_base, self.timeout)
            })
            .await
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(
        &self,
        messages: &[ChatCompletionRequestMessage],
        tools: &[ChatCompletionTool],
    ) -> Result<ModelReply> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages.to_vec());
        if !tools.is_empty() {
            args.tools(tools.to_vec());
        }
        let request = args
            .build()
            .map_err(|e| SkylarkError::Agent(e.to_string()))?;

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .client()
            .await?
            .chat()
            .create(request)
            .await
            .map_err(|e| SkylarkError::Model(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SkylarkError::Model("No response from model".to_string()))?;

        Ok(ModelReply {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }
}
