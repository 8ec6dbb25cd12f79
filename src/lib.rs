pub mod config;
pub mod confirm;
pub mod platform;
pub mod plugin;
pub mod reconcile;
pub mod server;
pub mod utils;

// Re-export commonly used types
pub use config::{read_config, ConfigError, DeploydConfig};
pub use confirm::{is_affirmative, AutoConfirm, Confirmation, StdinConfirm};
pub use platform::{
    ConsolePlatform, LifecycleOp, OperationError, PluginPlatform, RefreshError, DEFAULT_CONSOLE,
};
pub use plugin::{is_valid_plugin_name, PluginRecord};
pub use reconcile::{
    build_deployment_plan, execute_deployment, execute_plan, ActionOutcome, ActionResult,
    DeployDecision, DeploymentPlan, DeploymentReport, ExecuteError, PlannedAction,
};
pub use server::DeploydService;
