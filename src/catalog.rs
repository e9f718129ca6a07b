//! Helpers for maintaining the allowed model list.

use std::collections::HashSet;

/// Excluded terms applied when a profile does not name any.
pub const DEFAULT_EXCLUDED_MODELS: &[&str] = &["whisper", "playai"];

/// Returns true if any excluded term occurs in `model`, ignoring case.
pub fn is_excluded(model: &str, excluded: &[String]) -> bool {
    let model = model.to_lowercase();
    excluded
        .iter()
        .filter(|term| !term.is_empty())
        .any(|term| model.contains(&term.to_lowercase()))
}

/// Drops every model matched by an excluded term, preserving order.
pub fn filter_excluded(models: &[String], excluded: &[String]) -> Vec<String> {
    models
        .iter()
        .filter(|model| !is_excluded(model, excluded))
        .cloned()
        .collect()
}

/// The set difference between a configured model list and a refreshed one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelDiff {
    /// Models in the refreshed list but not the configured one, in refreshed order.
    pub added: Vec<String>,
    /// Models in the configured list but not the refreshed one, in configured order.
    pub removed: Vec<String>,
}

impl ModelDiff {
    /// Compare `current` against `refreshed`.
    pub fn between(current: &[String], refreshed: &[String]) -> Self {
        let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
        let refreshed_set: HashSet<&str> = refreshed.iter().map(String::as_str).collect();
        Self {
            added: refreshed
                .iter()
                .filter(|m| !current_set.contains(m.as_str()))
                .cloned()
                .collect(),
            removed: current
                .iter()
                .filter(|m| !refreshed_set.contains(m.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// True when both lists contain the same models.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
