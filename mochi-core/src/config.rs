//! Configuration types for the Mochi MCP adapter

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Mochi REST root
pub const DEFAULT_BASE_URL: &str = "https://app.mochi.cards/api/";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MochiConfig {
    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// MCP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Mochi REST API (trailing slash expected)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// API token (prefer `MOCHI_API_KEY` or `--token`)
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            token: None,
        }
    }
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name reported during `initialize`
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Server version reported during `initialize`
    #[serde(default = "default_server_version")]
    pub version: String,

    /// Whether to expose resources
    #[serde(default = "default_true")]
    pub enable_resources: bool,

    /// Whether to expose prompts
    #[serde(default = "default_true")]
    pub enable_prompts: bool,

    /// Tool allowlist (None = expose every tool)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_allowlist: Option<Vec<String>>,
}

fn default_server_name() -> String {
    "mochi-mcp".to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            enable_resources: true,
            enable_prompts: true,
            tool_allowlist: None,
        }
    }
}

impl MochiConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `mochi.toml` in the working directory
    /// 3. The file named by `MOCHI_CONFIG_PATH`, if set
    /// 4. `MOCHI_`-prefixed environment variables (`MOCHI_API__BASE_URL`, ...)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is invalid or validation fails.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(MochiConfig::default()))
            .merge(Toml::file("mochi.toml"));

        if let Ok(path) = std::env::var("MOCHI_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let figment = figment.merge(
            Env::prefixed("MOCHI_")
                .ignore(&["API_KEY", "CONFIG_PATH"])
                .split("__"),
        );

        let config: MochiConfig = figment.extract().map_err(|e| {
            crate::error::MochiError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: MochiConfig = Figment::from(Serialized::defaults(MochiConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| {
                crate::error::MochiError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api.token = Some(token.into());
        self
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }

    /// The configured token, if present and non-blank
    pub fn token(&self) -> Option<&str> {
        self.api
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or timeout is unusable.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::MochiError;

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            return Err(MochiError::Configuration("api.base_url must not be empty".into()));
        }

        let parsed = reqwest::Url::parse(base_url).map_err(|e| {
            MochiError::Configuration(format!("api.base_url '{}' is not a valid URL: {}", base_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MochiError::Configuration(format!(
                "api.base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.api.request_timeout.is_zero() {
            return Err(MochiError::Configuration(
                "api.request_timeout must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
