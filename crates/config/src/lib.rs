use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/onramp.toml";

/// Where users are sent when the runner is not reachable.
pub const OLLAMA_DOWNLOAD_URL: &str = "https://ollama.com/download";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.  Overridden at load time by the
    /// `OLLAMA_BASE_URL` environment variable when set.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Models and labels used by the local onboarding panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingConfig {
    /// Prefix an installed model must start with to count as the chat model.
    pub chat_model: String,
    /// Prefix an installed model must start with to count as the
    /// autocomplete (fill-in-the-middle) model.
    pub autocomplete_model: String,
    /// Title selected as the default model once onboarding is confirmed.
    pub chat_title: String,
    /// Label attached to every request the panel sends to the runner.
    pub local_model_title: String,
    pub poll_interval_ms: u64,
    /// The user already went through the free-trial flow.
    pub passed_free_trial: bool,
    /// The panel is rendered inside a dialog that must be closed on confirm.
    pub dialog: bool,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            chat_model: "llama3.1:8b".to_string(),
            autocomplete_model: "qwen2.5-coder:1.5b-base".to_string(),
            chat_title: "Llama 3.1 8B".to_string(),
            local_model_title: "Ollama".to_string(),
            poll_interval_ms: 3000,
            passed_free_trial: false,
            dialog: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub ollama: OllamaConfig,
    pub onboarding: OnboardingConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// A missing file yields the defaults; a file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config file {}", path.display()));
            }
        };

        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply environment overrides.  `lookup` is `std::env::var` in
    /// production; tests pass a closure so they never touch process state.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("OLLAMA_BASE_URL") {
            let value = value.trim();
            if !value.is_empty() {
                self.ollama.base_url = value.trim_end_matches('/').to_string();
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.onboarding.poll_interval_ms == 0 {
            bail!("onboarding.poll_interval_ms must be greater than zero");
        }
        if self.onboarding.chat_model.trim().is_empty() {
            bail!("onboarding.chat_model cannot be empty");
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
