//! Interactive chat client for OpenAI-compatible model APIs.
//!
//! Every message is sent to the active model as a fresh single-turn request; the answer,
//! token statistics and a Markdown transcript are produced for each exchange.
//!
//! # Usage
//!
//! ```bash
//! # Use ~/.groq-chat/config.yaml, creating it on first run from GROQ_API_KEY
//! groqchat
//!
//! # Start with another profile from the same directory
//! groqchat --profile work.yaml
//!
//! # Keep profiles and history somewhere else, without colors
//! groqchat --config-dir ./chat-data --no-color
//! ```
//!
//! # Commands
//!
//! - `i` - Show information about the active model
//! - `m` - Select a model
//! - `u` - Refresh the model list from the provider
//! - `h` - List saved transcripts
//! - `c` - Switch to another profile
//! - `q` - Exit the application

use std::process::ExitCode;

use arrrg::CommandLine;
use rustyline::DefaultEditor;

use groqchat::chat::{ChatArgs, ChatConfig, Dispatcher, PlainTextRenderer, Renderer};
use groqchat::profile::{DEFAULT_API_KEY_NAME, DEFAULT_PROFILE};
use groqchat::{
    ActiveProfile, Client, DEFAULT_BASE_URL, Error, HistoryStore, ProfileStore, Result,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("groqchat [OPTIONS]");
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };
    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ChatArgs) -> Result<()> {
    let config = ChatConfig::from_args(args)?;

    let profiles = ProfileStore::new(&config.config_dir);
    profiles.ensure_dir()?;
    let active = if !profiles.exists(&config.profile) && config.profile == DEFAULT_PROFILE {
        bootstrap(&profiles, config.use_color).await?
    } else {
        profiles.load(&config.profile)?
    };

    let client = connect(&active)?;
    let history = HistoryStore::new(config.history_dir());
    let mut dispatcher = Dispatcher::new(client, active, profiles, history, Box::new(connect))
        .with_max_models(config.max_models);

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut editor = DefaultEditor::new().map_err(|err| {
        Error::io(
            "failed to initialize line editor",
            std::io::Error::other(err.to_string()),
        )
    })?;
    dispatcher.run(&mut editor, &mut renderer).await;
    Ok(())
}

async fn bootstrap(profiles: &ProfileStore, use_color: bool) -> Result<ActiveProfile> {
    let key = profiles.env_var(DEFAULT_API_KEY_NAME).ok_or_else(|| {
        Error::config(
            format!("API key not found in environment variable {DEFAULT_API_KEY_NAME}"),
            None,
        )
    })?;
    let client = Client::new(DEFAULT_BASE_URL, &key)?;
    let active = profiles.bootstrap(DEFAULT_PROFILE, &client).await?;
    let mut renderer = PlainTextRenderer::with_color(use_color);
    renderer.print_info(&format!(
        "Config created at {}. Please review and adjust models and default model.",
        active.path.display()
    ));
    Ok(active)
}

fn connect(active: &ActiveProfile) -> Result<Client> {
    Client::new(&active.profile.base_url, &active.api_key)
}
