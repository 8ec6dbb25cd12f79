use super::{OperationError, PluginPlatform, RefreshError};
use crate::plugin::{is_valid_plugin_name, PluginRecord};
use crate::utils::first_line;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Default console binary, relative to the project directory.
pub const DEFAULT_CONSOLE: &str = "bin/console";

/// Platform binding that drives the host platform's own console tool.
///
/// One process per operation, the same commands an operator would type by
/// hand: `plugin:refresh`, `plugin:list --json`, `plugin:install <name>`
/// and so on.
#[derive(Debug, Clone)]
pub struct ConsolePlatform {
    console: PathBuf,
    working_dir: PathBuf,
}

impl ConsolePlatform {
    pub fn new(console: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            console: console.into(),
            working_dir: working_dir.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output, std::io::Error> {
        debug!(console = %self.console.display(), ?args, "running platform console");
        Command::new(&self.console)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
    }

    async fn run_lifecycle(
        &self,
        operation: &'static str,
        name: &str,
    ) -> Result<(), OperationError> {
        if !is_valid_plugin_name(name) {
            return Err(OperationError::Failed {
                plugin: name.to_string(),
                operation,
                reason: "invalid plugin name".to_string(),
            });
        }

        let command = format!("plugin:{operation}");
        let output = self.run(&[command.as_str(), name]).await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(OperationError::Failed {
                plugin: name.to_string(),
                operation,
                reason: failure_reason(&output),
            })
        }
    }
}

/// One-line reason from a failed console invocation.
fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = first_line(&stderr);
    if line.is_empty() {
        format!("exit status {}", output.status.code().unwrap_or(-1))
    } else {
        line
    }
}

#[async_trait]
impl PluginPlatform for ConsolePlatform {
    async fn refresh_registry(&self) -> Result<(), RefreshError> {
        let output = self.run(&["plugin:refresh"]).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RefreshError::CommandFailed(failure_reason(&output)))
        }
    }

    async fn list_managed_plugins(&self) -> Result<Vec<PluginRecord>, RefreshError> {
        let output = self.run(&["plugin:list", "--json"]).await?;
        if !output.status.success() {
            return Err(RefreshError::CommandFailed(failure_reason(&output)));
        }

        let records: Vec<PluginRecord> = serde_json::from_slice(&output.stdout)
            .map_err(|e| RefreshError::InvalidMetadata(e.to_string()))?;

        Ok(records
            .into_iter()
            .filter(|r| r.managed_by_composer)
            .collect())
    }

    async fn install(&self, name: &str) -> Result<(), OperationError> {
        self.run_lifecycle("install", name).await
    }

    async fn update(&self, name: &str) -> Result<(), OperationError> {
        self.run_lifecycle("update", name).await
    }

    async fn activate(&self, name: &str) -> Result<(), OperationError> {
        self.run_lifecycle("activate", name).await
    }

    async fn deactivate(&self, name: &str) -> Result<(), OperationError> {
        self.run_lifecycle("deactivate", name).await
    }
}
