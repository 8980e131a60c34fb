use std::time::Duration;

use onramp_config::OnboardingConfig;
use tracing::warn;

use crate::model::ModelName;
use crate::submit::OnboardingFlow;

/// Everything the panel needs to know that does not change while mounted.
#[derive(Debug, Clone)]
pub struct PanelSettings {
    pub chat_model: ModelName,
    pub autocomplete_model: ModelName,
    pub chat_title: String,
    /// Label sent with every listing and warm-up request.
    pub local_model_title: String,
    pub poll_interval: Duration,
    pub flow: OnboardingFlow,
    pub dialog: bool,
}

/// Used when the configured poll interval is zero.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

impl PanelSettings {
    /// The period the poll timer actually runs at.  A zero interval falls
    /// back to [`DEFAULT_POLL_INTERVAL`].
    pub fn poll_period(&self) -> Duration {
        if self.poll_interval.is_zero() {
            warn!(
                fallback_ms = DEFAULT_POLL_INTERVAL.as_millis() as u64,
                "poll interval is zero; using the default"
            );
            return DEFAULT_POLL_INTERVAL;
        }
        self.poll_interval
    }

    pub fn from_config(config: &OnboardingConfig) -> Self {
        Self {
            chat_model: ModelName::new(config.chat_model.clone()),
            autocomplete_model: ModelName::new(config.autocomplete_model.clone()),
            chat_title: config.chat_title.clone(),
            local_model_title: config.local_model_title.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            flow: OnboardingFlow::for_trial(config.passed_free_trial),
            dialog: config.dialog,
        }
    }
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self::from_config(&OnboardingConfig::default())
    }
}
