//! Client configuration: where the card API lives and which token to send.
//!
//! Values come from, highest priority first, the `KANBAN_API_URL` and
//! `KANBAN_TOKEN` environment variables, a TOML file, and the defaults.

use crate::error::{KanbanError, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Connection settings for the card repository
#[derive(Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Bearer token attached to every request when present
    pub token: Option<SecretString>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_url: Option<String>,
    token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:8001";
    pub const ENV_API_URL: &'static str = "KANBAN_API_URL";
    pub const ENV_TOKEN: &'static str = "KANBAN_TOKEN";
    const CONFIG_DIR: &'static str = "kanban";
    const CONFIG_FILE: &'static str = "config.toml";

    /// `<config dir>/kanban/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::CONFIG_DIR).join(Self::CONFIG_FILE))
    }

    /// Loads from the default file location and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path().as_deref())
    }

    /// Loads from `path` (skipped when missing) and the process environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "reading client config");
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml_str(&contents)?
            }
            _ => Self::default(),
        };

        let config = config.with_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        let mut config = Self::default();
        if let Some(api_url) = file.api_url {
            config.api_url = api_url;
        }
        config.token = file.token.filter(|t| !t.is_empty()).map(SecretString::from);
        Ok(config)
    }

    /// Overrides values with whatever `lookup` finds for the env variable names
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(api_url) = lookup(Self::ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = api_url;
        }
        if let Some(token) = lookup(Self::ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.token = Some(SecretString::from(token));
        }
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Checks that the API URL is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| KanbanError::Config(format!("invalid api_url '{}': {}", self.api_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(KanbanError::Config(format!(
                "api_url must use http or https, got '{}'",
                other
            ))),
        }
    }

    /// API URL without a trailing slash, ready for path joins
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}
