//! Request/response messaging with a local model runner.
//!
//! The onboarding panel only ever talks to the runner through the
//! [`Messenger`] trait, so it can be driven by the bundled
//! [`OllamaMessenger`] or by any host transport that speaks the same
//! `{status, content}` envelope.

mod messenger;
mod ollama;

pub use messenger::{
    CompletionOptions, CompletionRequest, ListModelsResponse, Messenger, MessengerError,
};
pub use ollama::{OllamaMessenger, model_names_from_tags};
