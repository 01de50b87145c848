//! Path steering between the host application and the MCP mount.

use appmcp::mcp::mount;
use appmcp::test_utils::test_helpers::create_test_db;
use appmcp::{apps, McpConfig};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

async fn mounted_app() -> Router {
    let pool = create_test_db().await.unwrap();
    let manifest = apps::manifest(pool);
    let config = McpConfig::default();
    let (registry, _) = appmcp::build_registry(&manifest, &config);

    let host = Router::new()
        .route("/", get(|| async { "home" }))
        .route("/hello", get(|| async { "hello world" }));

    let (app, _ct) = mount(host, Arc::new(registry), &config);
    app
}

async fn get_status(app: &Router, path: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn host_routes_still_work_under_the_mount() {
    let app = mounted_app().await;

    assert_eq!(get_status(&app, "/").await, StatusCode::OK);
    assert_eq!(get_status(&app, "/hello").await, StatusCode::OK);
}

#[tokio::test]
async fn dashboard_is_served_under_the_prefix() {
    let app = mounted_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/mcp/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("get_note"));
    assert!(html.contains("notes://{id}"));
    assert!(html.contains("summarize_note"));
    assert!(html.contains("/mcp/"));
}

#[tokio::test]
async fn near_miss_prefixes_fall_through_to_the_host() {
    let app = mounted_app().await;

    // Same leading characters, different path segment
    assert_eq!(get_status(&app, "/mcpx").await, StatusCode::NOT_FOUND);
    assert_eq!(get_status(&app, "/api/mcp").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_paths_under_the_prefix_stay_on_the_mcp_side() {
    let app = mounted_app().await;

    // Not a registered MCP route, but still answered by the MCP router
    // rather than the host.
    assert_eq!(
        get_status(&app, "/mcp/definitely-not-a-route").await,
        StatusCode::NOT_FOUND
    );
}
