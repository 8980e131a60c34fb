use std::sync::Arc;

use onramp_llm::{CompletionRequest, Messenger};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::action::{ConfirmOutcome, OnboardingAction};
use crate::settings::PanelSettings;
use crate::state::{PanelState, PanelStatus, PollOutcome};
use crate::store::AppStore;
use crate::submit::OnboardingSubmitter;
use crate::view::PanelView;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PanelError {
    #[error("onboarding panel is no longer mounted")]
    Unmounted,
}

enum PanelCommand {
    Confirm(oneshot::Sender<ConfirmOutcome>),
}

/// The mounted panel.  Runs as a single task that owns all panel state;
/// front ends talk to it through [`PanelHandle`].
pub struct OnboardingPanel {
    settings: PanelSettings,
    state: PanelState,
    action: OnboardingAction,
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn AppStore>,
    submitter: Arc<dyn OnboardingSubmitter>,
    status_tx: watch::Sender<PanelStatus>,
    results_tx: mpsc::UnboundedSender<PollOutcome>,
}

impl OnboardingPanel {
    /// Start polling.  The first listing request goes out immediately, then
    /// one per `settings.poll_interval` until the handle is unmounted or
    /// dropped.  Must be called from within a tokio runtime.
    pub fn mount(
        settings: PanelSettings,
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn AppStore>,
        submitter: Arc<dyn OnboardingSubmitter>,
    ) -> PanelHandle {
        let (status_tx, status_rx) = watch::channel(PanelStatus::default());
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        let panel = Self {
            state: PanelState::new(
                settings.chat_model.clone(),
                settings.autocomplete_model.clone(),
            ),
            action: OnboardingAction::from_settings(&settings),
            settings: settings.clone(),
            messenger,
            store,
            submitter,
            status_tx,
            results_tx,
        };
        let task = tokio::spawn(panel.run(command_rx, results_rx, cancel.clone()));

        PanelHandle {
            commands: command_tx,
            status: status_rx,
            settings,
            cancel,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<PanelCommand>,
        mut results: mpsc::UnboundedReceiver<PollOutcome>,
        cancel: CancellationToken,
    ) {
        let period = self.settings.poll_period();
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            chat_model = %self.settings.chat_model,
            interval_ms = period.as_millis() as u64,
            "onboarding panel mounted"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(command) = commands.recv() => self.handle_command(command),
                Some(outcome) = results.recv() => self.apply(outcome),
                // The first tick completes immediately.
                _ = interval.tick() => self.spawn_poll(),
            }
        }

        info!(polls = self.state.status().polls, "onboarding panel unmounted");
    }

    fn handle_command(&mut self, command: PanelCommand) {
        match command {
            PanelCommand::Confirm(reply) => {
                let outcome = self.action.confirm(
                    self.state.chat_ready(),
                    &*self.store,
                    &*self.submitter,
                );
                let _ = reply.send(outcome);
            }
        }
    }

    fn apply(&mut self, outcome: PollOutcome) {
        self.state.apply(outcome);
        if self.state.take_warmup() {
            self.spawn_warmup();
        }
        self.status_tx.send_replace(self.state.status());
    }

    /// Queries are not deduplicated: a slow one may still be running when
    /// the next tick fires, and whichever result arrives last wins.
    fn spawn_poll(&self) {
        let messenger = Arc::clone(&self.messenger);
        let title = self.settings.local_model_title.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let outcome = PollOutcome::from_result(messenger.list_models(&title).await);
            // Receiver is gone once the panel unmounts.
            let _ = results.send(outcome);
        });
    }

    fn spawn_warmup(&self) {
        let messenger = Arc::clone(&self.messenger);
        let request = CompletionRequest::warmup(self.settings.local_model_title.clone());
        let model = self.settings.chat_model.clone();
        info!(%model, "chat model installed; sending warm-up request");
        tokio::spawn(async move {
            match messenger.complete(request).await {
                Ok(_) => debug!(%model, "warm-up completed"),
                Err(err) => warn!(%model, error = %err, "warm-up request failed"),
            }
        });
    }
}

/// Front-end side of a mounted panel.  Dropping it unmounts the panel.
pub struct PanelHandle {
    commands: mpsc::Sender<PanelCommand>,
    status: watch::Receiver<PanelStatus>,
    settings: PanelSettings,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PanelHandle {
    pub fn status(&self) -> PanelStatus {
        self.status.borrow().clone()
    }

    pub fn view(&self) -> PanelView {
        PanelView::new(&self.status.borrow(), &self.settings)
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub fn subscribe(&self) -> watch::Receiver<PanelStatus> {
        self.status.clone()
    }

    /// Wait for the first snapshot (including the current one) matching
    /// `predicate`.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&PanelStatus) -> bool,
    ) -> Result<PanelStatus, PanelError> {
        let mut status = self.status.clone();
        let matched = status
            .wait_for(predicate)
            .await
            .map_err(|_| PanelError::Unmounted)?
            .clone();
        Ok(matched)
    }

    /// Press "Connect".  Returns [`ConfirmOutcome::Disabled`] while the
    /// chat model is missing.
    pub async fn confirm(&self) -> Result<ConfirmOutcome, PanelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(PanelCommand::Confirm(reply_tx))
            .await
            .map_err(|_| PanelError::Unmounted)?;
        reply_rx.await.map_err(|_| PanelError::Unmounted)
    }

    pub fn is_mounted(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel the poll timer and wait for the panel task to finish.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "onboarding panel task ended abnormally");
            }
        }
    }
}

impl Drop for PanelHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
