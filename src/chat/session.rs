//! In-memory state of a chat session.

use crate::error::{Error, Result};
use crate::profile::ActiveProfile;

/// The active model and profile.
///
/// The allowed model list is the active profile's `models`; the active model is always
/// one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    active_model: String,
    active: ActiveProfile,
}

/// What changed when a refreshed model list was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelListChange {
    /// The previous default model, if it was dropped and replaced.
    pub replaced_default: Option<String>,
    /// True if the active model was dropped and the session moved to the new default.
    pub active_switched: bool,
}

impl SessionState {
    /// Start a session on `active`'s default model.
    pub fn new(active: ActiveProfile) -> Self {
        Self {
            active_model: active.profile.default_model.clone(),
            active,
        }
    }

    /// The model messages are sent to.
    pub fn active_model(&self) -> &str {
        &self.active_model
    }

    /// The profile in use.
    pub fn profile(&self) -> &ActiveProfile {
        &self.active
    }

    /// The allowed models, in display order.
    pub fn models(&self) -> &[String] {
        &self.active.profile.models
    }

    /// Switch to `model`, which must be in the allowed list.
    pub fn select_model(&mut self, model: &str) -> Result<()> {
        if !self.active.profile.contains_model(model) {
            return Err(Error::config(
                format!("model '{model}' is not in the models list"),
                None,
            ));
        }
        self.active_model = model.to_string();
        Ok(())
    }

    /// Replace the allowed list.
    ///
    /// A default model missing from `models` becomes its first entry, and a missing
    /// active model follows the default.
    pub fn apply_models(&mut self, models: Vec<String>) -> Result<ModelListChange> {
        let Some(first) = models.first().cloned() else {
            return Err(Error::config("no models available", None));
        };
        let profile = &mut self.active.profile;
        profile.models = models;
        let mut change = ModelListChange::default();
        if !profile.contains_model(&profile.default_model) {
            change.replaced_default = Some(std::mem::replace(&mut profile.default_model, first));
        }
        if !profile.contains_model(&self.active_model) {
            self.active_model = profile.default_model.clone();
            change.active_switched = true;
        }
        Ok(change)
    }

    /// Swap in a new profile and start over on its default model.
    pub fn replace_profile(&mut self, active: ActiveProfile) {
        self.active_model = active.profile.default_model.clone();
        self.active = active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn active(name: &str, models: &[&str], default_model: &str) -> ActiveProfile {
        ActiveProfile {
            name: name.to_string(),
            path: PathBuf::from(name),
            profile: Profile {
                base_url: "https://api.example.com/v1".to_string(),
                default_model: default_model.to_string(),
                models: strings(models),
                ..Profile::default()
            },
            api_key: "k".to_string(),
        }
    }

    #[test]
    fn starts_on_default_model() {
        let state = SessionState::new(active("config.yaml", &["a", "b"], "b"));
        assert_eq!(state.active_model(), "b");
        assert_eq!(state.models(), strings(&["a", "b"]).as_slice());
    }

    #[test]
    fn select_only_allowed_models() {
        let mut state = SessionState::new(active("config.yaml", &["a", "b"], "a"));
        state.select_model("b").unwrap();
        assert_eq!(state.active_model(), "b");
        assert!(state.select_model("z").is_err());
        assert_eq!(state.active_model(), "b");
    }

    #[test]
    fn apply_models_keeps_surviving_choices() {
        let mut state = SessionState::new(active("config.yaml", &["a", "b"], "a"));
        state.select_model("b").unwrap();
        let change = state.apply_models(strings(&["c", "a", "b"])).unwrap();
        assert_eq!(change, ModelListChange::default());
        assert_eq!(state.active_model(), "b");
        assert_eq!(state.profile().profile.default_model, "a");
    }

    #[test]
    fn apply_models_replaces_dropped_default_and_active() {
        let mut state = SessionState::new(active("config.yaml", &["a", "b"], "a"));
        let change = state.apply_models(strings(&["c", "b"])).unwrap();
        assert_eq!(change.replaced_default, Some("a".to_string()));
        assert!(change.active_switched);
        assert_eq!(state.profile().profile.default_model, "c");
        assert_eq!(state.active_model(), "c");
    }

    #[test]
    fn apply_empty_list_changes_nothing() {
        let mut state = SessionState::new(active("config.yaml", &["a"], "a"));
        assert!(state.apply_models(Vec::new()).is_err());
        assert_eq!(state.models(), strings(&["a"]).as_slice());
    }

    #[test]
    fn replace_profile_resets_model() {
        let mut state = SessionState::new(active("config.yaml", &["a", "b"], "a"));
        state.select_model("b").unwrap();
        state.replace_profile(active("work.yaml", &["x", "y"], "y"));
        assert_eq!(state.profile().name, "work.yaml");
        assert_eq!(state.active_model(), "y");
    }
}
