use serde::Deserialize;
use std::time::Duration;

use crate::config::settings::{default_user_agent, ClientConfig, LoggingConfig};
use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SAFETY_MARGIN_SECS,
};

/// ================================
/// YAML file configuration (CLI)
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct FileConfig {
    pub client: ClientSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSection {
    pub iam_base_url: String,
    pub catalogue_base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// multiplied by the attempt number before every retry
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub safety_margin_seconds: Option<u64>,
}

impl From<&ClientSection> for ClientConfig {
    fn from(section: &ClientSection) -> Self {
        ClientConfig::new(&section.iam_base_url, &section.catalogue_base_url)
            .with_api_key(&section.api_key)
            .with_timeout(Duration::from_millis(
                section.timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS),
            ))
            .with_retry_delay(Duration::from_millis(
                section.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ))
            .with_max_retries(section.max_retries.unwrap_or(DEFAULT_MAX_RETRIES))
            .with_user_agent(section.user_agent.clone().unwrap_or_else(default_user_agent))
            .with_safety_margin(Duration::from_secs(
                section.safety_margin_seconds.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS),
            ))
    }
}

impl FileConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::from(&self.client)
    }
}
