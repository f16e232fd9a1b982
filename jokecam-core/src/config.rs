// jokecam-core/src/config.rs

//! Handles configuration structures and parsing for the jokecam library.

use serde::Deserialize;
use url::Url;

use crate::errors::{JokeError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
pub const CONFIG_FILENAME: &str = "Jokecam.toml";

/// The API key, or the lack of one.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Present(String),
    Absent,
}

impl Credential {
    /// Resolves a credential through `lookup`. Unset and blank values are `Absent`.
    pub fn resolve<F>(env_var: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(env_var) {
            Some(value) if !value.trim().is_empty() => {
                Credential::Present(value.trim().to_string())
            }
            _ => Credential::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Credential::Present(_))
    }
}

// Never print the key itself.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Present(_) => f.write_str("Credential::Present(<redacted>)"),
            Credential::Absent => f.write_str("Credential::Absent"),
        }
    }
}

/// Everything `ApiClient` needs to talk to the Messages endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub anthropic_version: String,
    pub api_key_env_var: String,
    pub credential: Credential,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            api_key_env_var: DEFAULT_API_KEY_ENV_VAR.to_string(),
            credential: Credential::Absent,
        }
    }
}

impl ClientConfig {
    pub fn with_credential(mut self, api_key: impl Into<String>) -> Self {
        self.credential = Credential::Present(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

// --- Jokecam.toml ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct JokecamConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub joke: JokeSection,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiSection {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub api_key_env_var: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct JokeSection {
    /// Replaces the built-in instruction sent alongside the photo.
    pub prompt: Option<String>,
}

impl JokecamConfig {
    pub fn from_toml_str(config_toml_content: &str) -> Result<JokecamConfig> {
        let config: JokecamConfig = match toml::from_str(config_toml_content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error=%e, "Failed to parse TOML content");
                return Err(JokeError::config(format!(
                    "Failed to parse configuration TOML content: {}",
                    e
                )));
            }
        };

        if let Some(endpoint) = &config.api.endpoint {
            if endpoint.trim().is_empty() {
                return Err(JokeError::config("'api.endpoint' is empty."));
            }
            Url::parse(endpoint).map_err(|e| {
                JokeError::config(format!(
                    "Invalid URL format for 'api.endpoint' ('{}'): {}",
                    endpoint, e
                ))
            })?;
        }
        if let Some(model) = &config.api.model {
            if model.trim().is_empty() {
                return Err(JokeError::config("'api.model' is empty."));
            }
        }
        if config.api.max_tokens == Some(0) {
            return Err(JokeError::config("'api.max_tokens' must be greater than zero."));
        }
        if let Some(var) = &config.api.api_key_env_var {
            if var.trim().is_empty() {
                return Err(JokeError::config("'api.api_key_env_var' is empty."));
            }
        }
        if let Some(prompt) = &config.joke.prompt {
            if prompt.trim().is_empty() {
                return Err(JokeError::config("'joke.prompt' is empty."));
            }
        }

        tracing::info!("Successfully parsed and validated jokecam configuration.");
        Ok(config)
    }

    /// Builds the client config, resolving the credential through `lookup`.
    pub fn into_client_config<F>(self, lookup: F) -> ClientConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ClientConfig::default();
        let api_key_env_var = self.api.api_key_env_var.unwrap_or(defaults.api_key_env_var);
        let credential = Credential::resolve(&api_key_env_var, lookup);
        ClientConfig {
            endpoint: self.api.endpoint.unwrap_or(defaults.endpoint),
            model: self.api.model.unwrap_or(defaults.model),
            max_tokens: self.api.max_tokens.unwrap_or(defaults.max_tokens),
            anthropic_version: defaults.anthropic_version,
            api_key_env_var,
            credential,
        }
    }
}
