mod common;

use common::{record, MockPlatform};
use deployd::server::proto::deployd_server::Deployd;
use deployd::server::proto::{ApplyRequest, ListPluginsRequest};
use deployd::server::DeploydService;
use std::sync::Arc;
use tonic::Request;

fn service_with(platform: MockPlatform) -> (Arc<MockPlatform>, DeploydService) {
    let platform = Arc::new(platform);
    let service = DeploydService::new(platform.clone());
    (platform, service)
}

#[tokio::test]
async fn test_deploy_all_applies_update_install_activate_per_plugin() {
    let (platform, service) = service_with(MockPlatform::with_plugins(vec![
        record("PluginA", None, None),
        record("PluginB", Some("2024-01-01T00:00:00Z"), Some("2.0")),
    ]));

    let response = service
        .deploy_all(Request::new(ApplyRequest {}))
        .await
        .expect("Should respond")
        .into_inner();

    assert!(response.success);
    assert!(!response.run_id.is_empty());
    assert_eq!(response.plugins.len(), 2);
    assert_eq!(response.reports.len(), 6);

    let applied: Vec<String> = response
        .reports
        .iter()
        .map(|r| format!("{}:{}", r.operation, r.plugin))
        .collect();
    assert_eq!(
        applied,
        vec![
            "update:PluginA",
            "install:PluginA",
            "activate:PluginA",
            "update:PluginB",
            "install:PluginB",
            "activate:PluginB"
        ]
    );

    assert_eq!(
        platform.calls(),
        vec![
            "refresh",
            "list",
            "update:PluginA",
            "install:PluginA",
            "activate:PluginA",
            "update:PluginB",
            "install:PluginB",
            "activate:PluginB"
        ]
    );
}

#[tokio::test]
async fn test_install_all_reports_per_plugin_failures_without_aborting() {
    let (platform, service) = service_with(
        MockPlatform::with_plugins(vec![
            record("PluginA", None, None),
            record("PluginB", None, None),
        ])
        .fail_on("install", "PluginA"),
    );

    let response = service
        .install_all(Request::new(ApplyRequest {}))
        .await
        .expect("Should respond")
        .into_inner();

    // The batch itself succeeds; the failure is per-plugin.
    assert!(response.success);
    assert_eq!(response.reports.len(), 2);

    assert!(!response.reports[0].success);
    assert!(response.reports[0].error.contains("install"));
    assert!(response.reports[1].success);
    assert!(response.reports[1].error.is_empty());

    // PluginB was still attempted after PluginA failed.
    assert!(platform.calls().contains(&"install:PluginB".to_string()));
}

#[tokio::test]
async fn test_refresh_failure_yields_unsuccessful_response() {
    let (platform, service) =
        service_with(MockPlatform::failing_refresh("composer.json is malformed"));

    let response = service
        .update_all(Request::new(ApplyRequest {}))
        .await
        .expect("Should respond")
        .into_inner();

    assert!(!response.success);
    assert!(response.error.contains("composer.json is malformed"));
    assert!(response.plugins.is_empty());
    assert!(response.reports.is_empty());
    assert_eq!(platform.calls(), vec!["refresh"]);
}

#[tokio::test]
async fn test_deactivate_all_applies_single_operation() {
    let (platform, service) = service_with(MockPlatform::with_plugins(vec![record(
        "PluginA",
        Some("2024-01-01T00:00:00Z"),
        None,
    )]));

    let response = service
        .deactivate_all(Request::new(ApplyRequest {}))
        .await
        .expect("Should respond")
        .into_inner();

    assert!(response.success);
    assert_eq!(response.reports.len(), 1);
    assert_eq!(response.reports[0].operation, "deactivate");
    assert_eq!(
        platform.calls(),
        vec!["refresh", "list", "deactivate:PluginA"]
    );
}

#[tokio::test]
async fn test_list_plugins_returns_refreshed_records() {
    let (_, service) = service_with(MockPlatform::with_plugins(vec![record(
        "PluginB",
        Some("2024-01-01T00:00:00Z"),
        Some("2.0"),
    )]));

    let list = service
        .list_plugins(Request::new(ListPluginsRequest {}))
        .await
        .expect("Should respond")
        .into_inner();

    assert_eq!(list.plugins.len(), 1);
    assert_eq!(list.plugins[0].name, "PluginB");
    assert_eq!(list.plugins[0].upgrade_version, "2.0");
    assert_eq!(list.plugins[0].installed_at, "2024-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_list_plugins_surfaces_refresh_failure_as_status() {
    let (_, service) = service_with(MockPlatform::failing_refresh("composer.json is malformed"));

    let status = service
        .list_plugins(Request::new(ListPluginsRequest {}))
        .await
        .expect_err("Should fail");

    assert_eq!(status.code(), tonic::Code::Internal);
    assert!(status.message().contains("composer.json is malformed"));
}
