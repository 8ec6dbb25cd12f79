use super::plan::{build_deployment_plan, DeployDecision, DeploymentPlan};
use crate::confirm::Confirmation;
use crate::platform::{OperationError, PluginPlatform, RefreshError};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Refresh error: {0}")]
    RefreshError(#[from] RefreshError),
}

/// Outcome of one plugin's reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The lifecycle operations ran and succeeded.
    Success,
    /// Nothing to do for this plugin.
    Skipped,
    /// The operator answered the confirmation prompt with no.
    Declined,
    /// A lifecycle operation failed; the reason is the platform's.
    Failed(String),
}

/// Per-plugin result, in plan order.
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub name: String,
    pub decision: DeployDecision,
    pub outcome: ActionOutcome,
}

/// Everything one deployment run produced.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub run_id: String,
    pub started_at: String,
    pub results: Vec<ActionResult>,
}

impl DeploymentReport {
    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ActionOutcome::Failed(_)))
            .count()
    }
}

/// Refresh, plan and run one deployment.
///
/// Lifecycle failures are isolated per plugin; only a registry refresh
/// failure or a prompt I/O failure aborts the run.
pub async fn execute_deployment(
    platform: &dyn PluginPlatform,
    confirm: &mut dyn Confirmation,
    cancel: &AtomicBool,
) -> Result<DeploymentReport, ExecuteError> {
    let plan = build_deployment_plan(platform).await?;
    execute_plan(platform, plan, confirm, cancel).await
}

/// Run an already-built plan.
///
/// One plugin is fully decided and acted upon before the next is
/// considered. The cancel flag is checked before each plugin; a cancelled
/// run keeps the results collected so far, no rollback.
pub async fn execute_plan(
    platform: &dyn PluginPlatform,
    plan: DeploymentPlan,
    confirm: &mut dyn Confirmation,
    cancel: &AtomicBool,
) -> Result<DeploymentReport, ExecuteError> {
    let mut report = DeploymentReport {
        run_id: Uuid::new_v4().to_string(),
        started_at: crate::utils::now_iso(),
        results: Vec::with_capacity(plan.actions.len()),
    };

    for action in plan.actions {
        if cancel.load(Ordering::SeqCst) {
            warn!(run_id = %report.run_id, "deployment cancelled, keeping completed actions");
            break;
        }

        let name = action.plugin.name.clone();
        let outcome = match action.decision {
            DeployDecision::Skip => ActionOutcome::Skipped,
            DeployDecision::Install => {
                if confirm.confirm(&format!("Install and activate {name}? (Y/n) "))? {
                    apply(install_and_activate(platform, &name).await)
                } else {
                    ActionOutcome::Declined
                }
            }
            DeployDecision::Update => {
                if confirm.confirm(&format!("Update {name}? (Y/n) "))? {
                    apply(platform.update(&name).await)
                } else {
                    ActionOutcome::Declined
                }
            }
        };

        match &outcome {
            ActionOutcome::Success => {
                info!(plugin = %name, decision = action.decision.as_str(), "plugin reconciled");
            }
            ActionOutcome::Failed(reason) => {
                warn!(plugin = %name, %reason, "lifecycle operation failed");
            }
            _ => {}
        }

        report.results.push(ActionResult {
            name,
            decision: action.decision,
            outcome,
        });
    }

    Ok(report)
}

fn apply(result: Result<(), OperationError>) -> ActionOutcome {
    match result {
        Ok(()) => ActionOutcome::Success,
        Err(e) => ActionOutcome::Failed(e.to_string()),
    }
}

async fn install_and_activate(
    platform: &dyn PluginPlatform,
    name: &str,
) -> Result<(), OperationError> {
    platform.install(name).await?;
    platform.activate(name).await
}
