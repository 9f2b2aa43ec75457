use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SAFETY_MARGIN_SECS, SDK_VERSION,
};

/// ================================
/// Client settings consumed by the request engine
/// ================================
#[derive(Clone)]
pub struct ClientConfig {
    pub iam_base_url: String,
    pub catalogue_base_url: String,
    pub api_key: String,
    /// per HTTP exchange, not per logical call
    pub timeout: Duration,
    /// base unit of the linear backoff
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub user_agent: String,
    /// access tokens are treated as expired this long before their `exp`
    pub safety_margin: Duration,
}

impl ClientConfig {
    /// Config with default timeouts and retries for the given service URLs.
    pub fn new(iam_base_url: impl Into<String>, catalogue_base_url: impl Into<String>) -> Self {
        Self {
            iam_base_url: iam_base_url.into(),
            catalogue_base_url: catalogue_base_url.into(),
            api_key: String::new(),
            timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: default_user_agent(),
            safety_margin: Duration::from_secs(DEFAULT_SAFETY_MARGIN_SECS),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_iam_base_url(mut self, url: impl Into<String>) -> Self {
        self.iam_base_url = url.into();
        self
    }

    pub fn with_catalogue_base_url(mut self, url: impl Into<String>) -> Self {
        self.catalogue_base_url = url.into();
        self
    }

    pub fn with_safety_margin(mut self, margin: Duration) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("iam_base_url", &self.iam_base_url)
            .field("catalogue_base_url", &self.catalogue_base_url)
            .field("api_key", &if self.has_api_key() { "<set>" } else { "<empty>" })
            .field("timeout", &self.timeout)
            .field("retry_delay", &self.retry_delay)
            .field("max_retries", &self.max_retries)
            .field("user_agent", &self.user_agent)
            .field("safety_margin", &self.safety_margin)
            .finish()
    }
}

pub fn default_user_agent() -> String {
    format!("catalogue-client-rs/{}", SDK_VERSION)
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}
