//! The interactive command loop.
//!
//! [`Dispatcher`] reads one line at a time, classifies it with [`parse_command`], and
//! either runs a control command or sends the line to the active model.  All state lives
//! in the dispatcher's [`SessionState`]; every failure after startup is reported through
//! the renderer and the loop carries on.

use std::ops::ControlFlow;

use time::OffsetDateTime;

use crate::catalog::{ModelDiff, filter_excluded};
use crate::chat::commands::{ChatCommand, MENU, is_confirmation, parse_command};
use crate::chat::input::LineSource;
use crate::chat::selection::{Selection, parse_selection};
use crate::chat::session::SessionState;
use crate::client::ModelApi;
use crate::error::{Error, Result};
use crate::history::HistoryStore;
use crate::profile::{ActiveProfile, ProfileStore};
use crate::render::Renderer;
use crate::types::ChatExchange;

use super::config::DEFAULT_MAX_MODELS;

/// Builds a backend for a newly selected profile.
pub type Connector<B> = Box<dyn Fn(&ActiveProfile) -> Result<B> + Send>;

/// Drives one chat session against a [`ModelApi`] backend.
pub struct Dispatcher<B: ModelApi> {
    api: B,
    state: SessionState,
    profiles: ProfileStore,
    history: HistoryStore,
    connect: Connector<B>,
    max_models: usize,
}

impl<B: ModelApi> Dispatcher<B> {
    /// Creates a dispatcher for `active`, already connected through `api`.
    pub fn new(
        api: B,
        active: ActiveProfile,
        profiles: ProfileStore,
        history: HistoryStore,
        connect: Connector<B>,
    ) -> Self {
        Self {
            api,
            state: SessionState::new(active),
            profiles,
            history,
            connect,
            max_models: DEFAULT_MAX_MODELS,
        }
    }

    /// Limits how many models the model picker lists.
    pub fn with_max_models(mut self, max_models: usize) -> Self {
        self.max_models = max_models.max(1);
        self
    }

    /// The session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The backend currently in use.
    pub fn api(&self) -> &B {
        &self.api
    }

    /// The main prompt, showing the active model.
    pub fn prompt(&self) -> String {
        format!("[{}] > ", self.state.active_model())
    }

    /// Prints the profile's title and the command menu.
    pub fn print_banner(&self, out: &mut dyn Renderer) {
        out.print_line(&self.state.profile().profile.app_title);
        out.print_line(MENU);
        out.print_line("");
    }

    /// Runs until the user quits or the input is exhausted.
    pub async fn run(&mut self, input: &mut dyn LineSource, out: &mut dyn Renderer) {
        self.print_banner(out);
        loop {
            let line = match input.read_line(&self.prompt()) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    out.print_error(&format!("Input error: {err}"));
                    break;
                }
            };
            let command = parse_command(&line);
            if command != ChatCommand::Empty {
                input.remember(line.trim());
            }
            if self.handle(command, input, out).await.is_break() {
                break;
            }
        }
    }

    /// Executes one command.  Returns `Break` after a quit.
    pub async fn handle(
        &mut self,
        command: ChatCommand,
        input: &mut dyn LineSource,
        out: &mut dyn Renderer,
    ) -> ControlFlow<()> {
        match command {
            ChatCommand::Info => {
                if let Err(err) = self.show_info(out).await {
                    out.print_error(&format!("Failed to retrieve model information: {err}"));
                }
            }
            ChatCommand::SelectModel => {
                if let Err(err) = self.select_model(input, out) {
                    out.print_error(&format!("Failed to select model: {err}"));
                }
            }
            ChatCommand::UpdateModels => {
                if let Err(err) = self.update_models(input, out).await {
                    out.print_error(&format!("Failed to update models: {err}"));
                }
            }
            ChatCommand::History => {
                if let Err(err) = self.show_history(out) {
                    out.print_error(&format!("Failed to read history: {err}"));
                }
            }
            ChatCommand::ChangeConfig => {
                if let Err(err) = self.change_config(input, out) {
                    out.print_error(&format!("Failed to change configuration: {err}"));
                }
            }
            ChatCommand::Quit => {
                out.print_line("Goodbye!");
                return ControlFlow::Break(());
            }
            ChatCommand::Empty => {}
            ChatCommand::Message(text) => {
                if let Err(err) = self.send_message(&text, out).await {
                    out.print_error(&format!("Chat request failed: {err}"));
                }
            }
        }
        ControlFlow::Continue(())
    }

    async fn show_info(&self, out: &mut dyn Renderer) -> Result<()> {
        let info = self.api.model_info(self.state.active_model()).await?;
        out.print_header("Model Information");
        out.print_line(&format!("- ID: {}", info.id));
        out.print_line(&format!("- Owned By: {}", info.owned_by));
        out.print_line(&format!("- Active: {}", info.active));
        out.print_line(&format!("- Context Window: {} tokens", info.context_window));
        out.print_rule();
        out.print_line("");
        Ok(())
    }

    fn select_model(&mut self, input: &mut dyn LineSource, out: &mut dyn Renderer) -> Result<()> {
        let models = self.state.models();
        let shown = models[..models.len().min(self.max_models)].to_vec();
        out.print_header("Available models");
        for (index, model) in shown.iter().enumerate() {
            out.print_line(&format!("{index} - {model}"));
        }
        match pick(input, out, "Select model", shown.len())? {
            Some(index) => {
                self.state.select_model(&shown[index])?;
                tracing::info!(model = %shown[index], "selected model");
            }
            None => out.print_info(&format!(
                "Invalid selection, model unchanged: {}",
                self.state.active_model()
            )),
        }
        Ok(())
    }

    async fn update_models(
        &mut self,
        input: &mut dyn LineSource,
        out: &mut dyn Renderer,
    ) -> Result<()> {
        let profile = &self.state.profile().profile;
        out.print_info(&format!(
            "Fetching latest models from {} API...",
            profile.provider_name
        ));
        let fetched = self.api.list_models().await?;
        let refreshed = filter_excluded(&fetched, &profile.excluded_models);
        if refreshed.is_empty() {
            return Err(Error::config("no models available", None));
        }

        let current = self.state.models();
        let diff = ModelDiff::between(current, &refreshed);
        if diff.is_empty() {
            out.print_info("No updates available. Your model list is already up to date.");
            return Ok(());
        }

        out.print_header("Model Updates Available");
        if !diff.added.is_empty() {
            out.print_line("New models:");
            for model in &diff.added {
                out.print_line(&format!("  + {model}"));
            }
        }
        if !diff.removed.is_empty() {
            out.print_line("Removed models:");
            for model in &diff.removed {
                out.print_line(&format!("  - {model}"));
            }
        }
        out.print_line(&format!(
            "Old list: {} models | New list: {} models",
            current.len(),
            refreshed.len()
        ));
        out.print_rule();

        let answer = input.read_line("Do you want to update the models list? (y/n): ")?;
        if !answer.as_deref().is_some_and(is_confirmation) {
            out.print_info("Update cancelled. Models list remains unchanged.");
            return Ok(());
        }

        let change = self.state.apply_models(refreshed)?;
        let default_model = &self.state.profile().profile.default_model;
        if let Some(previous) = &change.replaced_default {
            out.print_info(&format!(
                "Warning: Your default model '{previous}' is no longer available. Setting default to '{default_model}'."
            ));
        }
        if change.active_switched {
            out.print_info(&format!("Active model switched to '{default_model}'."));
        }
        tracing::info!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            "updated model list"
        );
        if let Err(err) = self.profiles.save(self.state.profile()) {
            out.print_error(&format!("Failed to save updated config: {err}"));
            return Ok(());
        }
        out.print_info("Models list updated successfully!");
        Ok(())
    }

    fn show_history(&self, out: &mut dyn Renderer) -> Result<()> {
        let entries = self.history.list()?;
        if entries.is_empty() {
            out.print_line("No chat history found.");
            return Ok(());
        }
        out.print_header("Chat History");
        for (index, entry) in entries.iter().enumerate() {
            out.print_line(&format!(
                "{index} - {} ({})",
                entry.file_name,
                entry.display_time()
            ));
        }
        Ok(())
    }

    fn change_config(&mut self, input: &mut dyn LineSource, out: &mut dyn Renderer) -> Result<()> {
        let names = self.profiles.list()?;
        if names.is_empty() {
            return Err(Error::config(
                "no configuration files found",
                Some(self.profiles.dir().to_path_buf()),
            ));
        }
        out.print_header("Available Configurations");
        for (index, name) in names.iter().enumerate() {
            out.print_line(&format!("{index} - {name}"));
        }
        let Some(index) = pick(input, out, "Select configuration", names.len())? else {
            out.print_error("Configuration selection cancelled.");
            return Ok(());
        };

        let loaded = self.profiles.load(&names[index])?;
        out.print_line(&format!("New configuration loaded from {}", loaded.name));
        out.print_line(&format!("Base URL: {}", loaded.profile.base_url));
        out.print_line(&format!("Default Model: {}", loaded.profile.default_model));
        out.print_line(&format!("Available Models: {}", loaded.profile.models.len()));

        let answer = input.read_line("Do you want to apply this configuration? (y/n): ")?;
        if !answer.as_deref().is_some_and(is_confirmation) {
            out.print_error("Configuration change cancelled.");
            return Ok(());
        }

        let api = (self.connect)(&loaded)?;
        tracing::info!(profile = %loaded.name, base_url = %loaded.profile.base_url, "switched profile");
        let name = loaded.name.clone();
        self.api = api;
        self.state.replace_profile(loaded);

        out.print_info(&format!("Configuration updated successfully from '{name}'!"));
        out.print_line("");
        self.print_banner(out);
        Ok(())
    }

    async fn send_message(&self, text: &str, out: &mut dyn Renderer) -> Result<()> {
        let model = self.state.active_model();
        let reply = self.api.chat(model, text).await?;
        let timestamp = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let exchange = ChatExchange::new(model, text, reply, timestamp);

        out.print_response(&exchange.response);
        out.print_stats(
            exchange.total_tokens,
            exchange.completion_time,
            exchange.tokens_per_second(),
        );
        if let Err(err) = self.history.append(&exchange) {
            out.print_error(&format!("Failed to save chat history: {err}"));
        }
        Ok(())
    }
}

/// Reads a numbered choice, re-prompting until it is valid or cancelled.
fn pick(
    input: &mut dyn LineSource,
    out: &mut dyn Renderer,
    label: &str,
    count: usize,
) -> Result<Option<usize>> {
    let prompt = format!("{label} (0-{}): ", count.saturating_sub(1));
    loop {
        out.print_rule();
        let Some(line) = input.read_line(&prompt)? else {
            return Ok(None);
        };
        match parse_selection(&line, count) {
            Ok(Selection::Index(index)) => return Ok(Some(index)),
            Ok(Selection::Cancel) => return Ok(None),
            Err(err) => out.print_error(&format!(
                "Invalid selection: {err}. Please try again or press Enter/Q to cancel."
            )),
        }
    }
}
