use tracing::info;

use crate::settings::PanelSettings;
use crate::store::{AppStore, DefaultModelSelection};
use crate::submit::{OnboardingFlow, OnboardingSubmitter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The chat model is not installed yet; nothing was dispatched.
    Disabled,
    Submitted,
}

/// The "Connect" button.
#[derive(Debug, Clone)]
pub struct OnboardingAction {
    flow: OnboardingFlow,
    dialog: bool,
    chat_title: String,
}

impl OnboardingAction {
    pub fn new(flow: OnboardingFlow, dialog: bool, chat_title: impl Into<String>) -> Self {
        Self {
            flow,
            dialog,
            chat_title: chat_title.into(),
        }
    }

    pub fn from_settings(settings: &PanelSettings) -> Self {
        Self::new(settings.flow, settings.dialog, settings.chat_title.clone())
    }

    pub fn confirm(
        &self,
        chat_ready: bool,
        store: &dyn AppStore,
        submitter: &dyn OnboardingSubmitter,
    ) -> ConfirmOutcome {
        if !chat_ready {
            return ConfirmOutcome::Disabled;
        }

        submitter.submit(self.flow, self.dialog);

        if self.dialog {
            store.set_dialog_message(None);
            store.set_show_dialog(false);
        }

        // Forced: the local model is not in the store's model list until the
        // host reloads its config.
        store.set_default_model(DefaultModelSelection {
            title: self.chat_title.clone(),
            force: true,
        });

        info!(flow = %self.flow, dialog = self.dialog, model = %self.chat_title, "local onboarding confirmed");
        ConfirmOutcome::Submitted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Mutex<Vec<(OnboardingFlow, bool)>>,
    }

    impl OnboardingSubmitter for RecordingSubmitter {
        fn submit(&self, flow: OnboardingFlow, is_dialog: bool) {
            self.calls.lock().unwrap().push((flow, is_dialog));
        }
    }

    /// Counts default-model dispatches on top of a [`MemoryStore`].
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        selections: Mutex<Vec<DefaultModelSelection>>,
    }

    impl AppStore for CountingStore {
        fn default_model(&self) -> Option<String> {
            self.inner.default_model()
        }
        fn set_default_model(&self, selection: DefaultModelSelection) {
            self.selections.lock().unwrap().push(selection.clone());
            self.inner.set_default_model(selection);
        }
        fn dialog_message(&self) -> Option<String> {
            self.inner.dialog_message()
        }
        fn set_dialog_message(&self, message: Option<String>) {
            self.inner.set_dialog_message(message);
        }
        fn show_dialog(&self) -> bool {
            self.inner.show_dialog()
        }
        fn set_show_dialog(&self, show: bool) {
            self.inner.set_show_dialog(show);
        }
    }

    #[test]
    fn disabled_while_chat_model_missing() {
        let action = OnboardingAction::new(OnboardingFlow::Local, true, "Llama 3.1 8B");
        let store = CountingStore::default();
        store.inner.open_dialog("pick a model");
        let submitter = RecordingSubmitter::default();

        assert_eq!(action.confirm(false, &store, &submitter), ConfirmOutcome::Disabled);
        assert!(submitter.calls.lock().unwrap().is_empty());
        assert!(store.selections.lock().unwrap().is_empty());
        assert!(store.show_dialog());
    }

    #[test]
    fn confirm_dispatches_exactly_one_forced_selection() {
        let action = OnboardingAction::new(OnboardingFlow::Local, false, "Llama 3.1 8B");
        let store = CountingStore::default();
        let submitter = RecordingSubmitter::default();

        assert_eq!(action.confirm(true, &store, &submitter), ConfirmOutcome::Submitted);
        assert_eq!(
            *store.selections.lock().unwrap(),
            vec![DefaultModelSelection {
                title: "Llama 3.1 8B".to_string(),
                force: true,
            }]
        );
        assert_eq!(store.default_model().as_deref(), Some("Llama 3.1 8B"));
        assert_eq!(
            *submitter.calls.lock().unwrap(),
            vec![(OnboardingFlow::Local, false)]
        );
    }

    #[test]
    fn dialog_mode_closes_dialog() {
        let action =
            OnboardingAction::new(OnboardingFlow::LocalAfterFreeTrial, true, "Llama 3.1 8B");
        let store = CountingStore::default();
        store.inner.open_dialog("pick a model");
        let submitter = RecordingSubmitter::default();

        action.confirm(true, &store, &submitter);
        assert!(!store.show_dialog());
        assert_eq!(store.dialog_message(), None);
        assert_eq!(
            *submitter.calls.lock().unwrap(),
            vec![(OnboardingFlow::LocalAfterFreeTrial, true)]
        );
    }

    #[test]
    fn inline_mode_leaves_dialog_alone() {
        let action = OnboardingAction::new(OnboardingFlow::Local, false, "Llama 3.1 8B");
        let store = CountingStore::default();
        store.inner.open_dialog("unrelated");
        let submitter = RecordingSubmitter::default();

        action.confirm(true, &store, &submitter);
        assert!(store.show_dialog());
        assert_eq!(store.dialog_message().as_deref(), Some("unrelated"));
    }
}
