//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved settings the
//! binary starts the chat loop with.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::error::Result;
use crate::profile::{DEFAULT_PROFILE, ProfileStore};

/// Default number of models listed by the model picker.
pub const DEFAULT_MAX_MODELS: usize = 20;

/// Command-line arguments for the groqchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Directory holding profiles and history.
    #[arrrg(optional, "Configuration directory (default: ~/.groq-chat)", "DIR")]
    pub config_dir: Option<String>,

    /// Profile file to load at startup.
    #[arrrg(optional, "Profile file within the config directory (default: config.yaml)", "FILE")]
    pub profile: Option<String>,

    /// Number of models shown by the model picker.
    #[arrrg(optional, "Models listed when selecting a model (default: 20)", "N")]
    pub max_models: Option<u32>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Directory holding profiles; history lives in its `history` subdirectory.
    pub config_dir: PathBuf,

    /// Profile file loaded at startup.
    pub profile: String,

    /// Number of models shown by the model picker.
    pub max_models: usize,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a configuration rooted at `config_dir` with default values.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            profile: DEFAULT_PROFILE.to_string(),
            max_models: DEFAULT_MAX_MODELS,
            use_color: true,
        }
    }

    /// Resolves command-line arguments, falling back to `~/.groq-chat`.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        let config_dir = match args.config_dir.as_deref() {
            Some(dir) => PathBuf::from(dir),
            None => ProfileStore::default_dir()?,
        };
        Ok(Self::resolve(args, config_dir))
    }

    fn resolve(args: ChatArgs, config_dir: PathBuf) -> Self {
        let defaults = Self::new(config_dir);
        ChatConfig {
            profile: args
                .profile
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.profile.clone()),
            max_models: args
                .max_models
                .filter(|n| *n > 0)
                .map(|n| n as usize)
                .unwrap_or(defaults.max_models),
            use_color: !args.no_color,
            ..defaults
        }
    }

    /// Where transcripts are written.
    pub fn history_dir(&self) -> PathBuf {
        self.config_dir.join("history")
    }
}
