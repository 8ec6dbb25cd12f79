use crate::platform::{LifecycleOp, PluginPlatform, RefreshError};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{info, warn};
use uuid::Uuid;

// Import generated protobuf types
pub mod proto {
    tonic::include_proto!("deployd");
}

use proto::deployd_server::Deployd;
use proto::*;

/// gRPC surface over the plugin lifecycle: the apply-all endpoints an
/// admin frontend or CI job drives, without any confirmation step.
pub struct DeploydService {
    platform: Arc<dyn PluginPlatform>,
}

impl DeploydService {
    pub fn new(platform: Arc<dyn PluginPlatform>) -> Self {
        Self { platform }
    }

    /// Refresh the registry and return the current managed plugin set.
    async fn refresh_and_list(&self) -> Result<Vec<crate::plugin::PluginRecord>, RefreshError> {
        self.platform.refresh_registry().await?;
        self.platform.list_managed_plugins().await
    }

    /// Apply one batch of operations to every managed plugin.
    ///
    /// A refresh failure produces an unsuccessful response with no reports;
    /// per-plugin operation failures are collected and reported without
    /// aborting the batch.
    async fn apply_all(&self, ops: &[LifecycleOp]) -> ApplyResponse {
        let run_id = Uuid::new_v4().to_string();

        let plugins = match self.refresh_and_list().await {
            Ok(plugins) => plugins,
            Err(e) => {
                warn!(%run_id, error = %e, "registry refresh failed");
                return ApplyResponse {
                    success: false,
                    error: e.to_string(),
                    run_id,
                    plugins: vec![],
                    reports: vec![],
                };
            }
        };

        let mut reports = Vec::new();
        for plugin in &plugins {
            for op in ops {
                let report = match op.apply(self.platform.as_ref(), &plugin.name).await {
                    Ok(()) => OperationReport {
                        plugin: plugin.name.clone(),
                        operation: op.as_str().to_string(),
                        success: true,
                        error: String::new(),
                    },
                    Err(e) => {
                        warn!(
                            plugin = %plugin.name,
                            operation = op.as_str(),
                            error = %e,
                            "lifecycle operation failed"
                        );
                        OperationReport {
                            plugin: plugin.name.clone(),
                            operation: op.as_str().to_string(),
                            success: false,
                            error: e.to_string(),
                        }
                    }
                };
                reports.push(report);
            }
        }

        info!(
            %run_id,
            plugins = plugins.len(),
            reports = reports.len(),
            "apply-all completed"
        );

        ApplyResponse {
            success: true,
            error: String::new(),
            run_id,
            plugins: plugins.iter().map(record_to_proto).collect(),
            reports,
        }
    }
}

#[tonic::async_trait]
impl Deployd for DeploydService {
    async fn deploy_all(
        &self,
        _request: Request<ApplyRequest>,
    ) -> Result<Response<ApplyResponse>, Status> {
        // Full convergence: update what is outdated, install what is
        // missing, then make sure everything is active.
        let ops = [
            LifecycleOp::Update,
            LifecycleOp::Install,
            LifecycleOp::Activate,
        ];
        Ok(Response::new(self.apply_all(&ops).await))
    }

    async fn install_all(
        &self,
        _request: Request<ApplyRequest>,
    ) -> Result<Response<ApplyResponse>, Status> {
        Ok(Response::new(self.apply_all(&[LifecycleOp::Install]).await))
    }

    async fn activate_all(
        &self,
        _request: Request<ApplyRequest>,
    ) -> Result<Response<ApplyResponse>, Status> {
        Ok(Response::new(self.apply_all(&[LifecycleOp::Activate]).await))
    }

    async fn update_all(
        &self,
        _request: Request<ApplyRequest>,
    ) -> Result<Response<ApplyResponse>, Status> {
        Ok(Response::new(self.apply_all(&[LifecycleOp::Update]).await))
    }

    async fn deactivate_all(
        &self,
        _request: Request<ApplyRequest>,
    ) -> Result<Response<ApplyResponse>, Status> {
        Ok(Response::new(
            self.apply_all(&[LifecycleOp::Deactivate]).await,
        ))
    }

    async fn list_plugins(
        &self,
        _request: Request<ListPluginsRequest>,
    ) -> Result<Response<PluginList>, Status> {
        match self.refresh_and_list().await {
            Ok(plugins) => Ok(Response::new(PluginList {
                plugins: plugins.iter().map(record_to_proto).collect(),
            })),
            Err(e) => Err(Status::internal(e.to_string())),
        }
    }
}

// Helper for converting internal records to proto records

fn record_to_proto(record: &crate::plugin::PluginRecord) -> PluginRecord {
    PluginRecord {
        name: record.name.clone(),
        managed_by_composer: record.managed_by_composer,
        installed_at: record.installed_at.clone().unwrap_or_default(),
        upgrade_version: record.upgrade_version.clone().unwrap_or_default(),
        active: record.active,
    }
}
