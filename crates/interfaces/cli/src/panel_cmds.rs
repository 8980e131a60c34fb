use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::info;

use onramp_config::AppConfig;
use onramp_llm::{ListModelsResponse, Messenger, OllamaMessenger};
use onramp_panel::{
    AppStore, ConfirmOutcome, MemoryStore, OnboardingFlow, OnboardingPanel, OnboardingSubmitter,
    PanelHandle, PanelSettings, PanelView, parse_listing,
};

/// Prints the completion notice; the CLI has no host to report to.
struct ConsoleSubmitter;

impl OnboardingSubmitter for ConsoleSubmitter {
    fn submit(&self, flow: OnboardingFlow, is_dialog: bool) {
        info!(%flow, is_dialog, "onboarding submitted");
        println!("onboarding complete ({flow})");
    }
}

fn messenger(config: &AppConfig) -> Result<Arc<OllamaMessenger>> {
    Ok(Arc::new(OllamaMessenger::new(
        config.ollama.base_url.clone(),
        config.onboarding.chat_model.clone(),
        Duration::from_secs(config.ollama.request_timeout_secs),
    )?))
}

fn mount(config: &AppConfig, store: Arc<MemoryStore>) -> Result<PanelHandle> {
    Ok(OnboardingPanel::mount(
        PanelSettings::from_config(&config.onboarding),
        messenger(config)?,
        store,
        Arc::new(ConsoleSubmitter),
    ))
}

pub(crate) async fn run_watch(config: &AppConfig, until_ready: bool, json: bool) -> Result<()> {
    let handle = mount(config, Arc::new(MemoryStore::new()))?;
    let mut updates = handle.subscribe();
    if !json {
        println!("{}\n", handle.view());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().clone();
                if json {
                    println!("{}", serde_json::to_string(&status)?);
                } else {
                    println!("{}\n", PanelView::new(&status, handle.settings()));
                }
                if until_ready && status.chat_ready {
                    break;
                }
            }
        }
    }

    handle.unmount().await;
    Ok(())
}

pub(crate) async fn run_connect(config: &AppConfig, timeout_secs: u64) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    if config.onboarding.dialog {
        store.open_dialog("Set up a local model");
    }
    let handle = mount(config, store.clone())?;

    println!(
        "waiting for {} on {} ...",
        config.onboarding.chat_model, config.ollama.base_url
    );
    let waited = tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        handle.wait_until(|status| status.chat_ready),
    )
    .await;

    let outcome = match waited {
        Ok(Ok(_)) => handle.confirm().await?,
        Ok(Err(err)) => {
            handle.unmount().await;
            return Err(err.into());
        }
        Err(_) => {
            println!("{}", handle.view());
            handle.unmount().await;
            bail!(
                "{} did not show up within {timeout_secs}s",
                config.onboarding.chat_model
            );
        }
    };
    handle.unmount().await;

    match outcome {
        ConfirmOutcome::Submitted => {
            println!(
                "default model: {}",
                store.default_model().unwrap_or_default()
            );
            Ok(())
        }
        ConfirmOutcome::Disabled => bail!("chat model disappeared before confirmation"),
    }
}

pub(crate) async fn run_models(config: &AppConfig) -> Result<()> {
    let messenger = messenger(config)?;
    match messenger
        .list_models(&config.onboarding.local_model_title)
        .await?
    {
        ListModelsResponse::Success { content } => {
            let Some(models) = parse_listing(&content) else {
                bail!("runner returned an unexpected model listing: {content}");
            };
            if models.is_empty() {
                println!("no models installed (run: ollama pull {})", config.onboarding.chat_model);
            }
            for model in models {
                println!("{model}");
            }
            Ok(())
        }
        ListModelsResponse::Error { error } => bail!("failed to fetch models: {error}"),
    }
}
