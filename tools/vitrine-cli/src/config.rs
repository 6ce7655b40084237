//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vitrine_commerce::CheckoutSettings;

/// Environment variable overriding `api.base_url`.
pub const ENV_API_URL: &str = "VITRINE_API_URL";

/// Environment variable overriding `store.company_id`.
pub const ENV_COMPANY_ID: &str = "VITRINE_COMPANY_ID";

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VitrineConfig {
    /// Storefront backend.
    #[serde(default)]
    pub api: ApiConfig,

    /// Store to order from.
    #[serde(default)]
    pub store: StoreConfig,

    /// Saved customer profile.
    #[serde(default)]
    pub profile: ProfileConfig,

    /// Checkout tunables.
    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl VitrineConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(&content, path.ends_with(".json"))
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// Apply `VITRINE_API_URL` and `VITRINE_COMPANY_ID` when set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(ENV_API_URL).ok(),
            std::env::var(ENV_COMPANY_ID).ok(),
        )
    }

    fn with_overrides(mut self, api_url: Option<String>, company_id: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(id) = company_id.filter(|c| !c.trim().is_empty()) {
            self.store.company_id = Some(id);
        }
        self
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the storefront API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for plain requests such as fetching delivery settings.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Store selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Company id used when a command does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// Profile storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Where the saved profile lives (default: ~/.local/share/vitrine/profile.json).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
