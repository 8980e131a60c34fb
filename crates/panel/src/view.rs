use std::fmt;

use onramp_config::OLLAMA_DOWNLOAD_URL;
use serde::Serialize;

use crate::settings::PanelSettings;
use crate::state::PanelStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerStatus {
    pub connected: bool,
    /// Only set while the runner is unreachable.
    pub download_url: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadStep {
    pub title: &'static str,
    pub model: String,
    pub downloaded: bool,
}

impl DownloadStep {
    pub fn pull_command(&self) -> String {
        format!("ollama pull {}", self.model)
    }
}

/// Render-ready description of the panel for one status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelView {
    pub runner: RunnerStatus,
    pub chat: DownloadStep,
    pub autocomplete: DownloadStep,
    pub connect_enabled: bool,
}

impl PanelView {
    pub fn new(status: &PanelStatus, settings: &PanelSettings) -> Self {
        Self {
            runner: RunnerStatus {
                connected: status.connected,
                download_url: (!status.connected).then_some(OLLAMA_DOWNLOAD_URL),
            },
            chat: DownloadStep {
                title: "Download Chat model",
                model: settings.chat_model.to_string(),
                downloaded: status.chat_ready,
            },
            autocomplete: DownloadStep {
                title: "Download Autocomplete model",
                model: settings.autocomplete_model.to_string(),
                downloaded: status.autocomplete_ready,
            },
            connect_enabled: status.chat_ready,
        }
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Install Ollama")?;
        match self.runner.download_url {
            None => writeln!(f, "  [x] Ollama is running")?,
            Some(url) => writeln!(f, "  [ ] Ollama is not running; download it from {url}")?,
        }

        for step in [&self.chat, &self.autocomplete] {
            writeln!(f, "{}", step.title)?;
            if step.downloaded {
                writeln!(f, "  [x] {} is installed", step.model)?;
            } else {
                writeln!(f, "  [ ] run: {}", step.pull_command())?;
            }
        }

        if self.connect_enabled {
            write!(f, "Connect: ready (run `onramp connect`)")
        } else {
            write!(f, "Connect: waiting for the chat model")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(status: PanelStatus) -> PanelView {
        PanelView::new(&status, &PanelSettings::default())
    }

    #[test]
    fn disconnected_view_offers_download_and_disables_connect() {
        let v = view(PanelStatus::default());
        assert_eq!(v.runner.download_url, Some(OLLAMA_DOWNLOAD_URL));
        assert!(!v.connect_enabled);
        assert_eq!(v.chat.pull_command(), "ollama pull llama3.1:8b");
        assert_eq!(
            v.autocomplete.pull_command(),
            "ollama pull qwen2.5-coder:1.5b-base"
        );
    }

    #[test]
    fn ready_view_enables_connect() {
        let v = view(PanelStatus {
            connected: true,
            chat_ready: true,
            ..PanelStatus::default()
        });
        assert_eq!(v.runner.download_url, None);
        assert!(v.chat.downloaded);
        assert!(!v.autocomplete.downloaded);
        assert!(v.connect_enabled);
    }

    #[test]
    fn rendered_text_lists_missing_pull_commands() {
        let text = view(PanelStatus {
            connected: true,
            chat_ready: true,
            ..PanelStatus::default()
        })
        .to_string();
        assert!(text.contains("Ollama is running"));
        assert!(text.contains("llama3.1:8b is installed"));
        assert!(text.contains("run: ollama pull qwen2.5-coder:1.5b-base"));
        assert!(text.ends_with("Connect: ready (run `onramp connect`)"));
    }
}
