use crate::platform::{PluginPlatform, RefreshError};
use crate::plugin::PluginRecord;
use tracing::info;

/// What a single plugin needs to converge with the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployDecision {
    /// Never installed: install, then activate.
    Install,
    /// Installed with a pending upgrade: update in place.
    Update,
    /// Installed and current: leave alone.
    Skip,
}

impl DeployDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployDecision::Install => "install",
            DeployDecision::Update => "update",
            DeployDecision::Skip => "skip",
        }
    }
}

/// Decide what to do for one plugin.
///
/// Install always wins for a plugin that was never installed, even when the
/// registry also reports an upgrade version for it; Update is only offered
/// for installed plugins with a non-empty upgrade version.
pub fn decide(record: &PluginRecord) -> DeployDecision {
    if !record.is_installed() {
        DeployDecision::Install
    } else if record.pending_upgrade().is_some() {
        DeployDecision::Update
    } else {
        DeployDecision::Skip
    }
}

/// One entry of a deployment plan.
#[derive(Debug, Clone)]
pub struct PlannedAction {
    pub plugin: PluginRecord,
    pub decision: DeployDecision,
}

/// The ordered plan for one deployment run.
///
/// Order follows the registry listing and is stable within a run.
#[derive(Debug, Clone, Default)]
pub struct DeploymentPlan {
    pub actions: Vec<PlannedAction>,
}

impl DeploymentPlan {
    /// Whether any plugin needs an install or update, and therefore a
    /// confirmation prompt in interactive mode.
    pub fn needs_confirmation(&self) -> bool {
        self.pending_count() > 0
    }

    pub fn pending_count(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| a.decision != DeployDecision::Skip)
            .count()
    }
}

/// Refresh the registry and build the plan for the current plugin set.
///
/// A refresh or listing failure aborts the whole run: without a valid
/// registry there is nothing to reconcile.
pub async fn build_deployment_plan(
    platform: &dyn PluginPlatform,
) -> Result<DeploymentPlan, RefreshError> {
    platform.refresh_registry().await?;

    let records = platform.list_managed_plugins().await?;

    let mut plan = DeploymentPlan::default();
    for record in records {
        // The platform is expected to pre-filter, but a manually uploaded
        // plugin must never be touched.
        if !record.managed_by_composer {
            continue;
        }

        let decision = decide(&record);
        plan.actions.push(PlannedAction {
            plugin: record,
            decision,
        });
    }

    info!(
        total = plan.actions.len(),
        pending = plan.pending_count(),
        "deployment plan built"
    );
    Ok(plan)
}
