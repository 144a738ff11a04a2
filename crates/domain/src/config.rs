//! Configuration structures
//!
//! Loaded by `canvas_infra::config` from environment variables or a
//! JSON/TOML file. Every section has defaults so a file only needs to name
//! what it overrides.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RATE_LIMIT_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Top-level client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP pipeline settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Canvas instance, e.g. `https://canvas.instructure.com`
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Fixed delay before replaying a throttled request
    pub rate_limit_delay_ms: u64,
    /// `None` retries throttled requests until they go through
    pub rate_limit_max_retries: Option<u32>,
    /// Transport attempts for connection failures (1 = no retry)
    pub transport_max_attempts: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://canvas.instructure.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            rate_limit_max_retries: None,
            transport_max_attempts: 1,
        }
    }
}

/// Where login sessions are persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file holding known sessions; in-memory only when unset
    pub store_path: Option<String>,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `canvas_infra=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
