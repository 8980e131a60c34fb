use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::messenger::{CompletionRequest, ListModelsResponse, Messenger, MessengerError};

/// [`Messenger`] backed by the Ollama HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaMessenger {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
}

impl OllamaMessenger {
    /// `default_model` is used for completions whose options name no model.
    pub fn new(
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MessengerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Messenger for OllamaMessenger {
    #[instrument(skip(self))]
    async fn list_models(&self, title: &str) -> Result<ListModelsResponse, MessengerError> {
        debug!(host = %self.base_url, "fetching installed models");
        let response = self.client.get(self.endpoint("api/tags")).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "model listing rejected");
            return Ok(ListModelsResponse::error(format!(
                "Ollama error ({status}): {body}"
            )));
        }

        let body: Value = response.json().await?;
        let content = model_names_from_tags(&body);
        if let Some(names) = content.as_array() {
            info!(count = names.len(), "fetched models from Ollama");
        }
        Ok(ListModelsResponse::success(content))
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    async fn complete(&self, request: CompletionRequest) -> Result<String, MessengerError> {
        let model = request
            .completion_options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());
        debug!(host = %self.base_url, %model, "sending completion");
        let payload = generate_payload(&model, &request);

        let response = self
            .client
            .post(self.endpoint("api/generate"))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MessengerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        match body.get("response").and_then(Value::as_str) {
            Some(text) => Ok(text.to_string()),
            None => Err(MessengerError::MissingText(body.to_string())),
        }
    }
}

/// Reduce an `/api/tags` body to the listing payload: an array of model
/// names.  A body without a `models` array yields `null`, which the panel
/// treats as malformed.
pub fn model_names_from_tags(body: &Value) -> Value {
    let Some(models) = body.get("models").and_then(Value::as_array) else {
        return Value::Null;
    };

    Value::Array(
        models
            .iter()
            .filter_map(|model| model.get("name").and_then(Value::as_str))
            .map(|name| Value::String(name.to_string()))
            .collect(),
    )
}

fn generate_payload(model: &str, request: &CompletionRequest) -> Value {
    let mut options = serde_json::Map::new();
    if let Some(temperature) = request.completion_options.temperature {
        options.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = request.completion_options.max_tokens {
        options.insert("num_predict".to_string(), json!(max_tokens));
    }

    json!({
        "model": model,
        "prompt": request.prompt,
        "stream": false,
        "options": options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompletionOptions;

    #[test]
    fn tags_body_reduces_to_names_in_order() {
        let body = json!({
            "models": [
                {"name": "llama3.1:8b", "size": 4_700_000_000u64, "digest": "abc"},
                {"name": "qwen2.5-coder:1.5b-base", "size": 986_000_000u64, "digest": "def"},
            ]
        });
        assert_eq!(
            model_names_from_tags(&body),
            json!(["llama3.1:8b", "qwen2.5-coder:1.5b-base"])
        );
    }

    #[test]
    fn tags_body_without_models_is_null() {
        assert_eq!(model_names_from_tags(&json!({"error": "boom"})), Value::Null);
        assert_eq!(model_names_from_tags(&json!({"models": "nope"})), Value::Null);
    }

    #[test]
    fn empty_tags_list_is_still_a_list() {
        assert_eq!(model_names_from_tags(&json!({"models": []})), json!([]));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let messenger =
            OllamaMessenger::new("http://localhost:11434/", "llama3.1:8b", Duration::from_secs(1))
                .unwrap();
        assert_eq!(messenger.base_url(), "http://localhost:11434");
        assert_eq!(messenger.endpoint("/api/tags"), "http://localhost:11434/api/tags");
    }

    #[test]
    fn warmup_payload_is_non_streaming_with_empty_prompt() {
        let payload = generate_payload("llama3.1:8b", &CompletionRequest::warmup("Ollama"));
        assert_eq!(payload["model"], "llama3.1:8b");
        assert_eq!(payload["prompt"], "");
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["options"], json!({}));
    }

    #[test]
    fn payload_maps_max_tokens_to_num_predict() {
        let request = CompletionRequest {
            completion_options: CompletionOptions {
                model: Some("other".to_string()),
                temperature: None,
                max_tokens: Some(16),
            },
            prompt: "hi".to_string(),
            title: "Ollama".to_string(),
        };
        let payload = generate_payload("other", &request);
        assert_eq!(payload["options"]["num_predict"], 16);
    }

    #[tokio::test]
    async fn unreachable_runner_is_a_transport_error() {
        let messenger =
            OllamaMessenger::new("http://127.0.0.1:9", "llama3.1:8b", Duration::from_secs(2))
                .unwrap();
        let result = messenger.list_models("Ollama").await;
        assert!(matches!(result, Err(MessengerError::Http(_))));
    }
}
