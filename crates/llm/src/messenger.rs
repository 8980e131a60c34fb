use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessengerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("runner error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("runner response missing text: {0}")]
    MissingText(String),
}

/// Reply envelope for a model listing.
///
/// `content` is kept as raw JSON: hosts are not trusted to always send a
/// list, and callers decide what a well-formed payload is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ListModelsResponse {
    Success {
        #[serde(default)]
        content: serde_json::Value,
    },
    Error {
        #[serde(default)]
        error: String,
    },
}

impl ListModelsResponse {
    pub fn success(content: serde_json::Value) -> Self {
        Self::Success { content }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub completion_options: CompletionOptions,
    pub prompt: String,
    pub title: String,
}

impl CompletionRequest {
    /// An empty-prompt completion, used only to make the runner load the
    /// model into memory.
    pub fn warmup(title: impl Into<String>) -> Self {
        Self {
            completion_options: CompletionOptions::default(),
            prompt: String::new(),
            title: title.into(),
        }
    }
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// List installed models on the runner identified by `title`.
    ///
    /// `Err` means the request never produced an envelope (transport
    /// failure); an unsuccessful envelope is `Ok(ListModelsResponse::Error)`.
    async fn list_models(&self, title: &str) -> Result<ListModelsResponse, MessengerError>;

    async fn complete(&self, request: CompletionRequest) -> Result<String, MessengerError>;
}
