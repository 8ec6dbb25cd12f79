use crate::platform::DEFAULT_CONSOLE;
use crate::utils::get_config_path;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn default_console() -> String {
    DEFAULT_CONSOLE.to_string()
}

/// Deployment configuration, read from `deployd.json` in the project
/// directory. Every field has a default, so the file is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploydConfig {
    /// Console binary the platform binding spawns, relative to the project
    /// directory unless absolute.
    #[serde(default = "default_console")]
    pub console: String,
}

impl Default for DeploydConfig {
    fn default() -> Self {
        Self {
            console: default_console(),
        }
    }
}

/// Read the configuration file
pub async fn read_config(project_path: &Path) -> Result<Option<DeploydConfig>, ConfigError> {
    let config_path = get_config_path(project_path);

    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&config_path).await?;
    let config: DeploydConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}
