use std::fmt;

use serde::{Deserialize, Serialize};

/// Which onboarding path the user finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnboardingFlow {
    Local,
    /// Local setup chosen after the free trial ran out.
    LocalAfterFreeTrial,
}

impl OnboardingFlow {
    pub fn for_trial(passed_free_trial: bool) -> Self {
        if passed_free_trial {
            Self::LocalAfterFreeTrial
        } else {
            Self::Local
        }
    }
}

impl fmt::Display for OnboardingFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("Local"),
            Self::LocalAfterFreeTrial => f.write_str("LocalAfterFreeTrial"),
        }
    }
}

/// Receives the "onboarding finished" notification.
pub trait OnboardingSubmitter: Send + Sync {
    fn submit(&self, flow: OnboardingFlow, is_dialog: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_labels() {
        assert_eq!(OnboardingFlow::Local.to_string(), "Local");
        assert_eq!(
            OnboardingFlow::LocalAfterFreeTrial.to_string(),
            "LocalAfterFreeTrial"
        );
    }

    #[test]
    fn flow_serializes_as_variant_name() {
        let json = serde_json::to_string(&OnboardingFlow::LocalAfterFreeTrial).unwrap();
        assert_eq!(json, "\"LocalAfterFreeTrial\"");
    }
}
