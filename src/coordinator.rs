//! Fleet coordinator.
//!
//! Wires settings, prompts, the fleet store and the chat model together and
//! hands out sessions. Direct operations bypass the model entirely.

use crate::agent::{ChatModel, ChatSession, OpenAiChatModel, SessionOptions, ToolContext};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::fleet::{detect_conflicts, ConflictReport, FleetSnapshot};
use crate::openai::ApiKey;
use crate::store::{create_store, FleetStore, StatusUpdate};
use std::sync::Arc;
use tracing::{info, instrument};

/// Entry point shared by the CLI, the HTTP API and the MCP server.
pub struct Coordinator {
    settings: Settings,
    prompts: Prompts,
    store: Arc<dyn FleetStore>,
}

impl Coordinator {
    /// Build a coordinator with the store selected in the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = create_store(&settings)?;
        info!("Using {} store", settings.sheets.provider);
        Self::with_store(settings, store)
    }

    /// Build a coordinator around an existing store.
    pub fn with_store(settings: Settings, store: Arc<dyn FleetStore>) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self {
            settings,
            prompts,
            store,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn FleetStore> {
        self.store.clone()
    }

    pub fn tools(&self) -> ToolContext {
        ToolContext::new(self.store.clone())
    }

    /// Start a conversation with the hosted model.
    pub fn new_session(&self, api_key: ApiKey) -> ChatSession {
        let model = OpenAiChatModel::new(api_key, &self.settings.agent);
        self.session_with_model(Box::new(model))
    }

    /// Start a conversation with any chat model.
    pub fn session_with_model(&self, model: Box<dyn ChatModel>) -> ChatSession {
        ChatSession::new(
            model,
            self.tools(),
            self.prompts.clone(),
            SessionOptions::from(&self.settings.agent),
        )
    }

    /// Current pilots, drones and missions.
    pub async fn snapshot(&self) -> Result<FleetSnapshot> {
        self.store.fetch_all().await
    }

    /// Run the conflict checks over a fresh snapshot.
    #[instrument(skip(self))]
    pub async fn conflicts(&self) -> Result<ConflictReport> {
        let snapshot = self.store.fetch_all().await?;
        let report = detect_conflicts(&snapshot);
        info!("Found {} conflicts", report.conflicts.len());
        Ok(report)
    }

    /// Update a pilot's status without going through the model.
    #[instrument(skip(self))]
    pub async fn update_pilot_status(&self, pilot_id: &str, new_status: &str) -> Result<StatusUpdate> {
        self.store.update_pilot_status(pilot_id, new_status).await
    }
}
