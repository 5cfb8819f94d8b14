//! Layered application configuration.
//!
//! Values come from built-in defaults, then `folio.toml` in the user config
//! directory, then `folio.toml` in the working directory, then `FOLIO__*`
//! environment variables (`FOLIO__RETRY__MAX_ATTEMPTS=5`).

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{games_file::DEFAULT_GAMES_PATH, models::Category};

/// File name looked up in each configuration directory.
pub const CONFIG_FILE_NAME: &str = "folio.toml";

/// Placeholder replaced by the credential in [`AppConfig::catalog_url`].
pub const API_KEY_PLACEHOLDER: &str = "{api_key}";

/// Growth of the delay between loader attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// `base * attempt`.
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

/// Retry settings for the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Delay growth between attempts.
    pub backoff: BackoffKind,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            backoff: BackoffKind::Linear,
        }
    }
}

/// Top-level configuration shared by the fetcher and the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog endpoint; `{api_key}` is replaced by the credential.
    pub catalog_url: String,
    /// Environment variable holding the catalog credential.
    pub api_key_env: String,
    /// Where the fetcher writes, and the loader reads by default.
    pub output_path: PathBuf,
    /// Optional URL the loader fetches instead of reading `output_path`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Category for games that match no inference rule.
    pub fallback_category: Category,
    /// Loader retry policy.
    pub retry: RetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: format!("https://itch.io/api/1/{API_KEY_PLACEHOLDER}/my-games"),
            api_key_env: "ITCH_API_KEY".to_string(),
            output_path: PathBuf::from(DEFAULT_GAMES_PATH),
            games_url: None,
            request_timeout_secs: 15,
            fallback_category: Category::Prototype,
            retry: RetrySettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the standard locations and the environment.
    pub fn load() -> Result<Self> {
        let mut files = Vec::new();
        if let Some(user) = default_config_path() {
            files.push(user);
        }
        files.push(PathBuf::from(CONFIG_FILE_NAME));
        Self::load_from(&files)
    }

    /// Load configuration from the given optional files (later files win),
    /// then apply `FOLIO__*` environment overrides.
    pub fn load_from(files: &[PathBuf]) -> Result<Self> {
        let mut builder = Config::builder();
        for path in files {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("FOLIO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Write the default configuration as TOML, creating parent directories.
    pub fn write_default(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized = toml::to_string_pretty(&Self::default())
            .context("failed to serialize default configuration")?;
        fs::write(path, serialized).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Credential from the environment; empty values count as missing.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Catalog endpoint with the credential substituted.
    pub fn catalog_endpoint(&self, api_key: &str) -> String {
        self.catalog_url.replace(API_KEY_PLACEHOLDER, api_key)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// `folio.toml` inside the platform config directory, if one exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join(CONFIG_FILE_NAME))
}
