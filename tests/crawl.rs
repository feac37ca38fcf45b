//! End-to-end crawls against a stub catalog.

mod common;

use kramlink::error::AppError;
use kramlink::models::NodeModel;
use kramlink::pipeline::run_download;
use kramlink::storage::{LocalStorage, PeriodicalStorage};
use serde_json::json;
use tempfile::TempDir;

use common::{Routes, config, serve, v5_routes, v7_routes, write_periodical};

#[tokio::test]
async fn test_v7_download_builds_and_persists_tree() {
    let stub = serve(v7_routes()).await;
    let tmp = TempDir::new().unwrap();
    write_periodical(tmp.path(), "per.json", "7", &stub.base_url);
    let storage = LocalStorage::new(tmp.path());

    let report = run_download(&config(), &storage, "per.json").await.unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.stats.node_count, 9);
    assert_eq!(report.stats.edge_count, 8);
    // info + volume count + 6 structure listings + 8 searches
    assert_eq!(report.stats.request_count, 16);
    assert_eq!(stub.hits(), 16);

    let periodical = storage.load_periodical("per.json").await.unwrap().unwrap();
    let tree = &periodical.tree;
    assert_eq!(tree.node_count(), 9);
    assert!(tree.is_tree());
    assert_eq!(tree.get("root/12/2/5").unwrap().uuid, "uuid:p5");
    assert_eq!(tree.get("root/13/1").unwrap().model, NodeModel::Issue);
    assert!(tree.children("root/13/2").is_empty());

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(tmp.path().join("per.json")).unwrap()).unwrap();
    assert_eq!(raw["tree"]["id"], "root");
    assert_eq!(raw["url"], "https://kramerius.example.cz/view");
}

#[tokio::test]
async fn test_v5_download_needs_no_detail_requests() {
    let stub = serve(v5_routes()).await;
    let tmp = TempDir::new().unwrap();
    write_periodical(tmp.path(), "per.json", "5", &format!("{}/", stub.base_url));
    let storage = LocalStorage::new(tmp.path());

    let report = run_download(&config(), &storage, "per.json").await.unwrap();
    assert_eq!(report.stats.node_count, 9);
    // info + volume count + 6 children listings
    assert_eq!(stub.hits(), 8);

    let periodical = storage.load_periodical("per.json").await.unwrap().unwrap();
    assert_eq!(
        periodical.link(Some("12"), Some("2"), Some("5")).as_deref(),
        Some("https://kramerius.example.cz/view/uuid/uuid:p5")
    );
    assert!(periodical.link(Some("sup"), None, None).is_none());
}

#[tokio::test]
async fn test_version_mismatch_aborts_before_traversal() {
    let routes = Routes::default().get("/search/api/client/v7.0/info", json!({"version": "5.3.7"}));
    let stub = serve(routes).await;
    let tmp = TempDir::new().unwrap();
    write_periodical(tmp.path(), "per.json", "7", &stub.base_url);
    let storage = LocalStorage::new(tmp.path());

    let err = run_download(&config(), &storage, "per.json").await.unwrap_err();
    assert!(matches!(err, AppError::VersionMismatch { .. }));
    assert_eq!(stub.hits(), 1);

    let periodical = storage.load_periodical("per.json").await.unwrap().unwrap();
    assert_eq!(periodical.tree.node_count(), 1);
}

#[tokio::test]
async fn test_missing_catalog_node_aborts_download() {
    let mut routes = v7_routes();
    routes = routes.get(
        "/search/api/client/v7.0/items/uuid:v13/info/structure",
        json!({"children": {"own": [{"pid": "uuid:gone"}]}}),
    );
    let stub = serve(routes).await;
    let tmp = TempDir::new().unwrap();
    write_periodical(tmp.path(), "per.json", "7", &stub.base_url);
    let storage = LocalStorage::new(tmp.path());

    let err = run_download(&config(), &storage, "per.json").await.unwrap_err();
    assert!(matches!(err, AppError::Status { status: 404, .. }));

    let periodical = storage.load_periodical("per.json").await.unwrap().unwrap();
    assert_eq!(periodical.tree.node_count(), 1);
}

#[tokio::test]
async fn test_missing_periodical_file_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let storage = LocalStorage::new(tmp.path());
    let err = run_download(&config(), &storage, "none.json").await.unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
