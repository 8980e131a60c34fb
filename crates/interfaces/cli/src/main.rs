mod panel_cmds;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use onramp_config::{AppConfig, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(
    name = "onramp",
    version,
    about = "Set up a local Ollama model as the default chat model"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show runner and model status, refreshed on every poll.
    Watch {
        /// Exit as soon as the chat model is installed.
        #[arg(long)]
        until_ready: bool,
        /// Print status snapshots as JSON lines instead of the panel text.
        #[arg(long)]
        json: bool,
    },
    /// Wait for the chat model, then confirm the local setup.
    Connect {
        #[arg(long, default_value_t = 600)]
        timeout_secs: u64,
    },
    /// List the models installed on the runner once.
    Models,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Write the default configuration.
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration (file + environment).
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.telemetry.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command.unwrap_or(Commands::Watch {
        until_ready: false,
        json: false,
    }) {
        Commands::Watch { until_ready, json } => {
            panel_cmds::run_watch(&config, until_ready, json).await?;
        }
        Commands::Connect { timeout_secs } => {
            panel_cmds::run_connect(&config, timeout_secs).await?;
        }
        Commands::Models => {
            panel_cmds::run_models(&config).await?;
        }
        Commands::Config(ConfigCommands::Init { force }) => {
            init_config(&cli.config, force)?;
        }
        Commands::Config(ConfigCommands::Show) => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    AppConfig::default().save_to(path)?;
    println!("wrote {}", path.display());
    Ok(())
}
