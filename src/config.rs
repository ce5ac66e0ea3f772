//! Global configuration parsing and validation.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::{AppError, Result};

/// Remote session gateway connectivity settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GatewayConfig {
    /// Base URL of the remote agent service, including the API prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout for gateway calls.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".into()
}

fn default_request_timeout_seconds() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

/// Status polling settings.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PollConfig {
    /// Fixed interval between status samples for an active run.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

fn default_interval_seconds() -> u64 {
    2
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
        }
    }
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Remote session gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Status polling settings.
    #[serde(default)]
    pub poll: PollConfig,
}

impl GlobalConfig {
    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the TOML is malformed or a value
    /// fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, the TOML is
    /// malformed, or a value fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("cannot read config: {err}")))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.gateway.base_url.trim().is_empty() {
            return Err(AppError::Config("gateway.base_url must not be empty".into()));
        }
        if self.poll.interval_seconds == 0 {
            return Err(AppError::Config(
                "poll.interval_seconds must be at least 1".into(),
            ));
        }
        if self.gateway.request_timeout_seconds == 0 {
            return Err(AppError::Config(
                "gateway.request_timeout_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
