// src/config.rs

use anyhow::{bail, Context, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://mainnet.ethereum.validationcloud.io/v1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_PORT: u16 = 8080;

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone)]
pub struct Config {
    // Server settings
    pub port: u16,

    // Node settings. The API key is appended to the base URL as the last path segment.
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

// Keep the API key out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Config {
    /// Config with every optional setting at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// The URL every JSON-RPC envelope is posted to.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.api_key)
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("VALIDATION_CLOUD_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            bail!("VALIDATION_CLOUD_API_KEY must be set");
        }

        Ok(Config {
            port: lookup("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_key,
            base_url: lookup("VALIDATION_CLOUD_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_ms: lookup("REQUEST_TIMEOUT_MS")
                .unwrap_or_else(|| DEFAULT_TIMEOUT_MS.to_string())
                .parse()
                .context("REQUEST_TIMEOUT_MS must be a valid number of milliseconds")?,
        })
    }
}
