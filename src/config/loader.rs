use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use reqwest::Url;
use tracing::{debug, error};

use crate::config::types::FileConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<FileConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<FileConfig> {
    let config: FileConfig = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse config error: {}", e);
    })?;

    debug!("validating config ...");
    validate_config(&config).map_err(|issues| anyhow!("invalid config: {}", issues.join("; ")))?;
    Ok(config)
}

/// Returns every issue found instead of stopping at the first one.
pub fn validate_config(config: &FileConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();
    let client = &config.client;

    for (field, value) in [
        ("client.iam_base_url", &client.iam_base_url),
        ("client.catalogue_base_url", &client.catalogue_base_url),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{field} must not be empty"));
        } else if let Err(e) = Url::parse(value) {
            errors.push(format!("{field} '{value}' is not a valid URL: {e}"));
        }
    }

    if client.api_key.trim().is_empty() {
        errors.push("client.api_key must not be empty".to_string());
    }
    if client.timeout_ms == Some(0) {
        errors.push("client.timeout_ms must be greater than 0".to_string());
    }
    if let Some(user_agent) = &client.user_agent {
        if user_agent.trim().is_empty() {
            errors.push("client.user_agent must not be blank".to_string());
        }
    }

    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "logging.level '{}' must be one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

/// Replaces `${VAR}` and `${VAR:default}` with values from the environment.
pub fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
