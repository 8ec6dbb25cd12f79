mod execute;
mod plan;

pub use execute::{
    execute_deployment, execute_plan, ActionOutcome, ActionResult, DeploymentReport, ExecuteError,
};
pub use plan::{build_deployment_plan, decide, DeployDecision, DeploymentPlan, PlannedAction};
