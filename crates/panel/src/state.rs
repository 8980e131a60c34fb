use onramp_llm::{ListModelsResponse, MessengerError};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::model::{ModelName, parse_listing};

/// What one listing request produced, reduced to the three cases the panel
/// reacts to differently.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Listed(Vec<ModelName>),
    Malformed,
    Failed(String),
}

impl PollOutcome {
    pub fn from_result(result: Result<ListModelsResponse, MessengerError>) -> Self {
        match result {
            Ok(ListModelsResponse::Success { content }) => match parse_listing(&content) {
                Some(models) => Self::Listed(models),
                None => Self::Malformed,
            },
            Ok(ListModelsResponse::Error { error }) if error.is_empty() => {
                Self::Failed("Failed to fetch models".to_string())
            }
            Ok(ListModelsResponse::Error { error }) => Self::Failed(error),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// Snapshot published to front ends after every state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelStatus {
    pub connected: bool,
    pub installed: Vec<ModelName>,
    pub chat_ready: bool,
    pub autocomplete_ready: bool,
    pub warmup_sent: bool,
    /// Listing results applied so far.
    pub polls: u64,
}

/// Connectivity, installed models and the warm-up latch.
///
/// Owned by exactly one task; nothing here is shared.
#[derive(Debug, Clone)]
pub struct PanelState {
    chat_model: ModelName,
    autocomplete_model: ModelName,
    installed: Vec<ModelName>,
    connected: bool,
    warmup_sent: bool,
    polls: u64,
}

impl PanelState {
    pub fn new(chat_model: ModelName, autocomplete_model: ModelName) -> Self {
        Self {
            chat_model,
            autocomplete_model,
            installed: Vec::new(),
            connected: false,
            warmup_sent: false,
            polls: 0,
        }
    }

    pub fn apply(&mut self, outcome: PollOutcome) {
        self.polls += 1;
        match outcome {
            PollOutcome::Listed(models) => {
                if !self.connected {
                    info!(count = models.len(), "model runner connected");
                }
                self.installed = models;
                self.connected = true;
            }
            PollOutcome::Malformed => {
                debug!("model listing was not a list of names; treating runner as disconnected");
                self.installed.clear();
                self.connected = false;
            }
            PollOutcome::Failed(reason) => {
                error!(error = %reason, "error fetching models");
                self.connected = false;
            }
        }
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn installed(&self) -> &[ModelName] {
        &self.installed
    }

    pub fn chat_ready(&self) -> bool {
        self.has_model(&self.chat_model)
    }

    pub fn autocomplete_ready(&self) -> bool {
        self.has_model(&self.autocomplete_model)
    }

    pub fn warmup_sent(&self) -> bool {
        self.warmup_sent
    }

    /// Returns `true` exactly once: the first time it is called while the
    /// chat model is installed.  The caller must then send the warm-up.
    pub fn take_warmup(&mut self) -> bool {
        if self.warmup_sent || !self.chat_ready() {
            return false;
        }
        self.warmup_sent = true;
        true
    }

    pub fn status(&self) -> PanelStatus {
        PanelStatus {
            connected: self.connected,
            installed: self.installed.clone(),
            chat_ready: self.chat_ready(),
            autocomplete_ready: self.autocomplete_ready(),
            warmup_sent: self.warmup_sent,
            polls: self.polls,
        }
    }

    fn has_model(&self, expected: &ModelName) -> bool {
        self.installed
            .iter()
            .any(|installed| installed.matches_prefix(expected))
    }
}
