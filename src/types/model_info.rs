use serde::{Deserialize, Serialize};

/// Metadata for a single model, as returned by `GET /models/{id}`.
///
/// Only the fields the console displays are decoded; anything else the provider sends
/// (`object`, `created`, `public_apps`, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique model identifier.
    pub id: String,

    /// The organization that owns the model.
    #[serde(default)]
    pub owned_by: String,

    /// Whether the provider currently serves the model.
    #[serde(default)]
    pub active: bool,

    /// Context window size in tokens.
    #[serde(default)]
    pub context_window: u64,
}

/// One entry of the `GET /models` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Unique model identifier.
    pub id: String,
}

/// The body of a `GET /models` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    /// Models in server order.
    pub data: Vec<ModelEntry>,
}

impl ModelList {
    /// Returns the model identifiers in server order.
    pub fn into_ids(self) -> Vec<String> {
        self.data.into_iter().map(|entry| entry.id).collect()
    }
}
