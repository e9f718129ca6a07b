// Public modules
pub mod catalog;
pub mod chat;
pub mod client;
pub mod error;
pub mod history;
pub mod profile;
pub mod render;
pub mod types;

mod observability;

// Re-exports
pub use client::{Client, DEFAULT_BASE_URL, ModelApi};
pub use error::{Error, Result};
pub use history::{HistoryEntry, HistoryStore};
pub use observability::register_biometrics;
pub use profile::{ActiveProfile, Profile, ProfileStore};
pub use types::*;
