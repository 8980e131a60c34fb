//! Headless local-model onboarding panel.
//!
//! [`OnboardingPanel::mount`] starts a task that polls the runner for its
//! installed models, warms the chat model up the first time it shows up, and
//! publishes a [`PanelStatus`] snapshot after every change.  The returned
//! [`PanelHandle`] is how a front end reads status, confirms the setup, and
//! tears the panel down.

mod action;
mod model;
mod panel;
mod settings;
mod state;
mod store;
mod submit;
mod view;

pub use action::{ConfirmOutcome, OnboardingAction};
pub use model::{ModelName, parse_listing};
pub use panel::{OnboardingPanel, PanelError, PanelHandle};
pub use settings::{DEFAULT_POLL_INTERVAL, PanelSettings};
pub use state::{PanelState, PanelStatus, PollOutcome};
pub use store::{AppStore, DefaultModelSelection, MemoryStore};
pub use submit::{OnboardingFlow, OnboardingSubmitter};
pub use view::{DownloadStep, PanelView, RunnerStatus};
