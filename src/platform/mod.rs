mod console;

pub use console::{ConsolePlatform, DEFAULT_CONSOLE};

use crate::plugin::PluginRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Failure while refreshing or reading the plugin registry.
///
/// Fatal for a deployment run: with no valid registry there is nothing to
/// reconcile.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("registry refresh failed: {0}")]
    CommandFailed(String),

    #[error("invalid plugin metadata: {0}")]
    InvalidMetadata(String),
}

/// Failure of a single lifecycle operation.
///
/// Isolated to one plugin; the run continues with the remaining plugins.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{operation} failed for {plugin}: {reason}")]
    Failed {
        plugin: String,
        operation: &'static str,
        reason: String,
    },
}

/// The state transitions the platform can apply to a single plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Install,
    Update,
    Activate,
    Deactivate,
}

impl LifecycleOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleOp::Install => "install",
            LifecycleOp::Update => "update",
            LifecycleOp::Activate => "activate",
            LifecycleOp::Deactivate => "deactivate",
        }
    }

    /// Apply this operation to one plugin.
    pub async fn apply(
        self,
        platform: &dyn PluginPlatform,
        name: &str,
    ) -> Result<(), OperationError> {
        match self {
            LifecycleOp::Install => platform.install(name).await,
            LifecycleOp::Update => platform.update(name).await,
            LifecycleOp::Activate => platform.activate(name).await,
            LifecycleOp::Deactivate => platform.deactivate(name).await,
        }
    }
}

/// The external plugin platform: the registry plus the lifecycle
/// primitives.
///
/// deployd implements none of these itself; a binding to the host platform
/// is injected wherever a run is driven.
#[async_trait]
pub trait PluginPlatform: Send + Sync {
    /// Force the registry to re-scan the composer-managed package source.
    async fn refresh_registry(&self) -> Result<(), RefreshError>;

    /// List the plugins whose source is composer-managed.
    async fn list_managed_plugins(&self) -> Result<Vec<PluginRecord>, RefreshError>;

    async fn install(&self, name: &str) -> Result<(), OperationError>;
    async fn update(&self, name: &str) -> Result<(), OperationError>;
    async fn activate(&self, name: &str) -> Result<(), OperationError>;
    async fn deactivate(&self, name: &str) -> Result<(), OperationError>;
}
