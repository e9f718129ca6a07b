//! Interactive chat application.
//!
//! This module provides the REPL built on top of the [`ModelApi`](crate::ModelApi)
//! client. Each line the user types is either a single-letter control command or a
//! message sent to the active model as a fresh single-turn request.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: classification of input lines
//! - [`selection`]: numbered-choice parsing shared by the model and profile pickers
//! - [`session`]: the active model and profile
//! - [`input`]: the line source abstraction and its `rustyline` implementation
//! - [`dispatcher`]: the command loop itself

mod commands;
mod config;
mod dispatcher;
mod input;
mod selection;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, MENU, is_confirmation, parse_command};
pub use config::{ChatArgs, ChatConfig, DEFAULT_MAX_MODELS};
pub use dispatcher::{Connector, Dispatcher};
pub use input::LineSource;
pub use selection::{Selection, parse_selection};
pub use session::{ModelListChange, SessionState};
