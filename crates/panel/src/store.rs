use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultModelSelection {
    pub title: String,
    /// Select the model even when the store does not know it yet.
    pub force: bool,
}

/// Application-wide state shared between the panel and the rest of the UI.
pub trait AppStore: Send + Sync {
    fn default_model(&self) -> Option<String>;
    fn set_default_model(&self, selection: DefaultModelSelection);
    fn dialog_message(&self) -> Option<String>;
    fn set_dialog_message(&self, message: Option<String>);
    fn show_dialog(&self) -> bool;
    fn set_show_dialog(&self, show: bool);
}

#[derive(Debug, Default)]
struct StoreState {
    known_models: Vec<String>,
    default_model: Option<String>,
    dialog_message: Option<String>,
    show_dialog: bool,
}

/// In-process [`AppStore`].
///
/// An unforced selection of a title that is not in `known_models` is
/// ignored, the same way a config-backed store would refuse it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_models(models: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let store = Self::default();
        store.lock().known_models = models.into_iter().map(Into::into).collect();
        store
    }

    /// Open the dialog with `message`, as the host does before showing the
    /// onboarding panel in dialog mode.
    pub fn open_dialog(&self, message: impl Into<String>) {
        let mut state = self.lock();
        state.dialog_message = Some(message.into());
        state.show_dialog = true;
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AppStore for MemoryStore {
    fn default_model(&self) -> Option<String> {
        self.lock().default_model.clone()
    }

    fn set_default_model(&self, selection: DefaultModelSelection) {
        let mut state = self.lock();
        let known = state.known_models.iter().any(|title| *title == selection.title);
        if !known && !selection.force {
            debug!(title = %selection.title, "ignoring selection of unknown model");
            return;
        }
        state.default_model = Some(selection.title);
    }

    fn dialog_message(&self) -> Option<String> {
        self.lock().dialog_message.clone()
    }

    fn set_dialog_message(&self, message: Option<String>) {
        self.lock().dialog_message = message;
    }

    fn show_dialog(&self) -> bool {
        self.lock().show_dialog
    }

    fn set_show_dialog(&self, show: bool) {
        self.lock().show_dialog = show;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(title: &str, force: bool) -> DefaultModelSelection {
        DefaultModelSelection {
            title: title.to_string(),
            force,
        }
    }

    #[test]
    fn unforced_unknown_selection_is_ignored() {
        let store = MemoryStore::new();
        store.set_default_model(select("Llama 3.1 8B", false));
        assert_eq!(store.default_model(), None);
    }

    #[test]
    fn forced_selection_applies_to_unknown_model() {
        let store = MemoryStore::new();
        store.set_default_model(select("Llama 3.1 8B", true));
        assert_eq!(store.default_model().as_deref(), Some("Llama 3.1 8B"));
    }

    #[test]
    fn unforced_known_selection_applies() {
        let store = MemoryStore::with_known_models(["GPT-4o"]);
        store.set_default_model(select("GPT-4o", false));
        assert_eq!(store.default_model().as_deref(), Some("GPT-4o"));
    }

    #[test]
    fn dialog_open_and_close() {
        let store = MemoryStore::new();
        store.open_dialog("Set up a local model");
        assert!(store.show_dialog());
        assert_eq!(store.dialog_message().as_deref(), Some("Set up a local model"));

        store.set_dialog_message(None);
        store.set_show_dialog(false);
        assert!(!store.show_dialog());
        assert_eq!(store.dialog_message(), None);
    }
}
