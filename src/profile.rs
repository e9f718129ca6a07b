//! Provider profiles and the directory that stores them.
//!
//! A profile is a YAML file naming a provider endpoint, the environment variable that
//! holds its API key, and the models the user wants to choose from.  The
//! [`ProfileStore`] lists, loads, validates and saves profiles in one directory
//! (`~/.groq-chat` unless overridden).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::{DEFAULT_EXCLUDED_MODELS, filter_excluded};
use crate::client::{DEFAULT_BASE_URL, ModelApi};
use crate::error::{Error, Result};

/// Profile loaded when none is named on the command line.
pub const DEFAULT_PROFILE: &str = "config.yaml";

/// Environment variable consulted when a profile does not name one.
pub const DEFAULT_API_KEY_NAME: &str = "GROQ_API_KEY";

/// Title printed above the menu.
pub const DEFAULT_APP_TITLE: &str = "🍎 One-shot Groq CLI chat";

/// Provider label used in console messages.
pub const DEFAULT_PROVIDER_NAME: &str = "Groq";

const CONFIG_DIR_NAME: &str = ".groq-chat";

/// Connection settings and model list for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Title printed above the menu.
    #[serde(default)]
    pub app_title: String,

    /// Provider label used in console messages.
    #[serde(default)]
    pub provider_name: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default)]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_name: String,

    /// API key stored in the file itself; takes precedence over the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model selected at startup.
    #[serde(default)]
    pub default_model: String,

    /// Models offered for selection.
    #[serde(default)]
    pub models: Vec<String>,

    /// Case-insensitive substrings of models to hide when refreshing.
    #[serde(default)]
    pub excluded_models: Vec<String>,
}

impl Profile {
    /// Build the first-run profile from the provider's model listing.
    ///
    /// Models matched by the default excluded terms are dropped and the rest sorted; the
    /// first one becomes the default.
    pub fn bootstrap(available: &[String]) -> Result<Self> {
        let excluded: Vec<String> = DEFAULT_EXCLUDED_MODELS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut models = filter_excluded(available, &excluded);
        models.sort();
        let Some(first) = models.first().cloned() else {
            return Err(Error::config("no models available", None));
        };
        Ok(Self {
            app_title: DEFAULT_APP_TITLE.to_string(),
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_name: DEFAULT_API_KEY_NAME.to_string(),
            api_key: None,
            default_model: first,
            models,
            excluded_models: excluded,
        })
    }

    /// Check the profile and fill in defaults.
    ///
    /// Rejects an empty or unparsable base URL, an empty model list, and a default model
    /// that is not in the list.  An empty default model becomes the first listed model.
    pub fn validate(&mut self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url is missing", None));
        }
        url::Url::parse(&self.base_url)?;
        if self.models.is_empty() {
            return Err(Error::config("no models defined", None));
        }
        if self.default_model.is_empty() {
            self.default_model = self.models[0].clone();
        } else if !self.contains_model(&self.default_model) {
            return Err(Error::config(
                format!(
                    "default model '{}' not found in models list",
                    self.default_model
                ),
                None,
            ));
        }
        if self.api_key_name.is_empty() {
            self.api_key_name = DEFAULT_API_KEY_NAME.to_string();
        }
        if self.excluded_models.is_empty() {
            self.excluded_models = DEFAULT_EXCLUDED_MODELS
                .iter()
                .map(|s| s.to_string())
                .collect();
        }
        if self.app_title.is_empty() {
            self.app_title = DEFAULT_APP_TITLE.to_string();
        }
        if self.provider_name.is_empty() {
            self.provider_name = DEFAULT_PROVIDER_NAME.to_string();
        }
        Ok(())
    }

    /// Returns the embedded key, or the value of the profile's key variable.
    pub fn resolve_api_key(&self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }
        let name = if self.api_key_name.is_empty() {
            DEFAULT_API_KEY_NAME
        } else {
            &self.api_key_name
        };
        lookup(name).filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            Error::config(
                format!("API key not found in environment variable {name}"),
                None,
            )
        })
    }

    /// Returns true if `model` is one of the allowed models.
    pub fn contains_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }
}

/// A validated profile together with where it came from and its resolved key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProfile {
    /// File name within the profile directory.
    pub name: String,
    /// Full path of the profile file.
    pub path: PathBuf,
    /// The validated settings.
    pub profile: Profile,
    /// The API key to authenticate with.
    pub api_key: String,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads and writes profiles in one directory.
pub struct ProfileStore {
    dir: PathBuf,
    env: EnvLookup,
}

impl ProfileStore {
    /// Create a store rooted at `dir`, resolving keys from the process environment.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replace how environment variables are looked up.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    /// `~/.groq-chat`.
    pub fn default_dir() -> Result<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(CONFIG_DIR_NAME))
            .ok_or_else(|| Error::config("failed to get home directory", None))
    }

    /// The directory holding the profiles.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path a profile named `name` lives at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Returns true if a profile named `name` exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Look up an environment variable through the store's lookup.
    pub fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Create the profile directory if it is missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|err| {
            Error::io(
                format!(
                    "failed to create config directory {}",
                    self.dir.display()
                ),
                err,
            )
        })
    }

    /// File names of every `.yaml`/`.yml` profile, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|err| {
            Error::config(
                format!("failed to read config directory: {err}"),
                Some(self.dir.clone()),
            )
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".yaml") || name.ends_with(".yml") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load, validate and resolve the key for the profile named `name`.
    pub fn load(&self, name: &str) -> Result<ActiveProfile> {
        let path = self.path_for(name);
        let text = fs::read_to_string(&path).map_err(|err| {
            Error::config_with_source(
                format!("failed to read config: {err}"),
                Some(path.clone()),
                err,
            )
        })?;
        let mut profile: Profile = serde_yaml::from_str(&text).map_err(|err| {
            Error::config_with_source(
                format!("failed to unmarshal config: {err}"),
                Some(path.clone()),
                err,
            )
        })?;
        profile.validate().map_err(|err| at_path(err, &path))?;
        let api_key = profile
            .resolve_api_key(&|name| self.env_var(name))
            .map_err(|err| at_path(err, &path))?;
        tracing::debug!(profile = name, base_url = %profile.base_url, "loaded profile");
        Ok(ActiveProfile {
            name: name.to_string(),
            path,
            profile,
            api_key,
        })
    }

    /// Write `active.profile` back to `active.path`, replacing the file.
    pub fn save(&self, active: &ActiveProfile) -> Result<()> {
        let yaml = serde_yaml::to_string(&active.profile)?;
        fs::write(&active.path, yaml).map_err(|err| {
            Error::io(
                format!("failed to write config {}", active.path.display()),
                err,
            )
        })?;
        tracing::info!(path = %active.path.display(), "saved profile");
        Ok(())
    }

    /// Create the profile `name` from the provider's model listing and load it.
    pub async fn bootstrap<A: ModelApi + ?Sized>(
        &self,
        name: &str,
        api: &A,
    ) -> Result<ActiveProfile> {
        let available = api.list_models().await?;
        let profile = Profile::bootstrap(&available)?;
        self.ensure_dir()?;
        let path = self.path_for(name);
        let yaml = serde_yaml::to_string(&profile)?;
        fs::write(&path, yaml).map_err(|err| {
            Error::io(format!("failed to write config {}", path.display()), err)
        })?;
        tracing::info!(
            path = %path.display(),
            models = profile.models.len(),
            "created default profile"
        );
        self.load(name)
    }
}

fn at_path(err: Error, path: &Path) -> Error {
    match err {
        Error::Config {
            message,
            path: None,
            source,
        } => Error::Config {
            message,
            path: Some(path.to_path_buf()),
            source,
        },
        Error::Url {
            message,
            source: Some(source),
        } => Error::config_with_source(message, Some(path.to_path_buf()), source),
        Error::Url { message, .. } => Error::config(message, Some(path.to_path_buf())),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChatReply, ModelDescriptor};
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn profile(models: &[&str], default_model: &str) -> Profile {
        Profile {
            base_url: "https://api.example.com/v1".to_string(),
            default_model: default_model.to_string(),
            models: strings(models),
            ..Profile::default()
        }
    }

    fn store(dir: &TempDir) -> ProfileStore {
        ProfileStore::new(dir.path()).with_env_lookup(|name| match name {
            "GROQ_API_KEY" => Some("env-key".to_string()),
            "OTHER_KEY" => Some("other-key".to_string()),
            _ => None,
        })
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let mut p = profile(&[], "");
        let err = p.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("no models defined"));
    }

    #[test]
    fn default_model_must_be_listed() {
        let mut p = profile(&["a", "b"], "c");
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("default model 'c'"));
    }

    #[test]
    fn empty_default_model_becomes_first() {
        let mut p = profile(&["a", "b"], "");
        p.validate().unwrap();
        assert_eq!(p.default_model, "a");
    }

    #[test]
    fn validate_fills_defaults() {
        let mut p = profile(&["a"], "a");
        p.validate().unwrap();
        assert_eq!(p.api_key_name, DEFAULT_API_KEY_NAME);
        assert_eq!(p.excluded_models, strings(&["whisper", "playai"]));
        assert_eq!(p.app_title, DEFAULT_APP_TITLE);
        assert_eq!(p.provider_name, DEFAULT_PROVIDER_NAME);
    }

    #[test]
    fn missing_or_bad_base_url_is_rejected() {
        let mut p = profile(&["a"], "a");
        p.base_url = String::new();
        assert!(p.validate().unwrap_err().to_string().contains("base_url"));

        let mut p = profile(&["a"], "a");
        p.base_url = "not a url".to_string();
        assert!(p.validate().unwrap_err().is_config());
    }

    #[test]
    fn embedded_key_wins_over_environment() {
        let mut p = profile(&["a"], "a");
        p.api_key = Some("embedded".to_string());
        let key = p
            .resolve_api_key(&|_| Some("from-env".to_string()))
            .unwrap();
        assert_eq!(key, "embedded");
    }

    #[test]
    fn key_is_read_from_named_variable() {
        let mut p = profile(&["a"], "a");
        p.api_key_name = "OTHER_KEY".to_string();
        let key = p
            .resolve_api_key(&|name| (name == "OTHER_KEY").then(|| "k".to_string()))
            .unwrap();
        assert_eq!(key, "k");

        let err = p.resolve_api_key(&|_| None).unwrap_err();
        assert!(err.to_string().contains("OTHER_KEY"));
    }

    #[test]
    fn bootstrap_filters_and_sorts() {
        let available = strings(&["mixtral", "whisper-large-v3", "gemma", "PlayAI-tts"]);
        let p = Profile::bootstrap(&available).unwrap();
        assert_eq!(p.models, strings(&["gemma", "mixtral"]));
        assert_eq!(p.default_model, "gemma");
        assert_eq!(p.base_url, DEFAULT_BASE_URL);
        assert!(Profile::bootstrap(&strings(&["whisper"])).is_err());
    }

    #[test]
    fn list_only_yaml_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("work.yml"), "").unwrap();
        fs::write(dir.path().join("config.yaml"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("history")).unwrap();
        assert_eq!(
            store(&dir).list().unwrap(),
            strings(&["config.yaml", "work.yml"])
        );
    }

    #[test]
    fn load_validates_and_resolves_key() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "base_url: https://api.example.com/v1\nmodels:\n  - a\n  - b\n",
        )
        .unwrap();
        let active = store(&dir).load("config.yaml").unwrap();
        assert_eq!(active.name, "config.yaml");
        assert_eq!(active.profile.default_model, "a");
        assert_eq!(active.api_key, "env-key");
    }

    #[test]
    fn load_reports_path_on_invalid_profile() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("bad.yaml"),
            "base_url: https://api.example.com/v1\nmodels: []\n",
        )
        .unwrap();
        let err = store(&dir).load("bad.yaml").unwrap_err();
        match err {
            Error::Config { path, .. } => assert_eq!(path, Some(dir.path().join("bad.yaml"))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_keeps_yaml_cause() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.yaml"), "models: [a\n").unwrap();
        let err = store(&dir).load("broken.yaml").unwrap_err();
        assert!(err.to_string().contains("failed to unmarshal config"));
        let source = std::error::Error::source(&err).expect("yaml source");
        assert!(source.downcast_ref::<serde_yaml::Error>().is_some());
    }

    #[test]
    fn load_fails_without_key() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("p.yaml"),
            "base_url: https://api.example.com/v1\napi_key_name: MISSING\nmodels: [a]\n",
        )
        .unwrap();
        let err = store(&dir).load("p.yaml").unwrap_err();
        assert!(err.to_string().contains("MISSING"));
    }

    #[test]
    fn save_round_trips_through_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "base_url: https://api.example.com/v1\nmodels: [a, b]\ndefault_model: b\n",
        )
        .unwrap();
        let store = store(&dir);
        let mut active = store.load("config.yaml").unwrap();
        active.profile.models.push("c".to_string());
        store.save(&active).unwrap();

        let reloaded = store.load("config.yaml").unwrap();
        assert_eq!(reloaded.profile.models, strings(&["a", "b", "c"]));
        assert_eq!(reloaded.profile.default_model, "b");
        let text = fs::read_to_string(dir.path().join("config.yaml")).unwrap();
        assert!(!text.contains("api_key:"));
    }

    struct Listing(Vec<String>);

    #[async_trait::async_trait]
    impl ModelApi for Listing {
        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }

        async fn model_info(&self, _: &str) -> Result<ModelDescriptor> {
            unreachable!()
        }

        async fn chat(&self, _: &str, _: &str) -> Result<ChatReply> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn bootstrap_writes_default_profile() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("cfg");
        let store = ProfileStore::new(&nested).with_env_lookup(|_| Some("k".to_string()));
        let api = Listing(strings(&["llama", "whisper-large-v3", "gemma"]));

        let active = store.bootstrap(DEFAULT_PROFILE, &api).await.unwrap();
        assert!(store.exists(DEFAULT_PROFILE));
        assert_eq!(active.profile.models, strings(&["gemma", "llama"]));
        assert_eq!(active.profile.default_model, "gemma");
        assert_eq!(active.api_key, "k");
    }
}
