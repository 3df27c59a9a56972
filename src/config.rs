//! Configuration for the Airtable MCP server
//!
//! The credential itself never appears in configuration files. The config
//! names an environment variable and the key is resolved from the process
//! environment at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub airtable: AirtableSection,
}

/// Airtable section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirtableSection {
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Airtable REST endpoint, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AirtableSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "AIRTABLE_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.airtable.api_key_env)
            .map_err(|_| ConfigError::EnvVarNotFound(self.airtable.api_key_env.clone()))
    }
}
