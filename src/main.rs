//! perplexity-chat - host process for the chat side panel.
//!
//! `serve` speaks the panel protocol as JSON lines over stdin/stdout.
//! Logs go to stderr so they never mix with protocol output.

use std::io::IsTerminal;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use perplexity_chat::adapters::bridge::JsonLinesBridge;
use perplexity_chat::adapters::completion::PerplexityProvider;
use perplexity_chat::adapters::secrets::FileSecretStore;
use perplexity_chat::application::{ChatPanel, ChatSession, ChatSessionConfig};
use perplexity_chat::config::{AppConfig, ConfigError, LoggingConfig, ValidationError};
use perplexity_chat::domain::models::AVAILABLE_MODELS;
use perplexity_chat::ports::{
    BridgeError, CompletionError, SecretStore, SecretStoreError, API_KEY_SECRET_ID,
};

#[derive(Parser)]
#[command(name = "perplexity-chat")]
#[command(version, about = "Streaming Perplexity chat bridge for a side-panel UI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the panel protocol over stdin/stdout (default)
    Serve,
    /// Store the Perplexity API key
    SetApiKey {
        /// The key; read from stdin when omitted
        key: Option<String>,
    },
    /// List selectable models
    Models,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Secrets(#[from] SecretStoreError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("No API Token Provided!")]
    EmptyApiKey,

    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    config.validate()?;
    init_logging(&config.logging);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await?,
        Commands::SetApiKey { key } => set_api_key(&config, key).await?,
        Commands::Models => list_models(&config),
    }

    Ok(())
}

/// Install the tracing subscriber, honouring `RUST_LOG` over the configured level
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if logging.json {
        builder.json().init();
    } else {
        builder.with_ansi(std::io::stderr().is_terminal()).init();
    }
}

async fn serve(config: &AppConfig) -> Result<(), CliError> {
    let provider = Arc::new(PerplexityProvider::new(&config.completion)?);
    let secrets = Arc::new(FileSecretStore::new(&config.secrets.path));
    let session = ChatSession::with_config(provider, ChatSessionConfig::from(&config.completion));
    let mut panel = ChatPanel::with_model(session, secrets, &config.completion.default_model);

    info!(
        endpoint = %config.completion.completions_url(),
        model = %config.completion.default_model,
        "Starting chat bridge"
    );

    let mut bridge = JsonLinesBridge::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
    bridge.run(&mut panel).await?;
    Ok(())
}

async fn set_api_key(config: &AppConfig, key: Option<String>) -> Result<(), CliError> {
    let key = match key {
        Some(key) => key,
        None => {
            let mut line = String::new();
            BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
            line
        }
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::EmptyApiKey);
    }

    let store = FileSecretStore::new(&config.secrets.path);
    store
        .store(API_KEY_SECRET_ID, SecretString::new(key.to_string()))
        .await?;

    info!(path = %store.path().display(), "API key saved");
    Ok(())
}

fn list_models(config: &AppConfig) {
    for model in AVAILABLE_MODELS {
        if *model == config.completion.default_model {
            println!("{} (default)", model);
        } else {
            println!("{}", model);
        }
    }
}
