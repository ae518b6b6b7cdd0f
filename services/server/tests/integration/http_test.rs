use std::sync::Arc;

use axum_test::TestServer;
use sea_orm::DatabaseConnection;

use lineup_server::config::ServerConfig;
use lineup_server::router::build_router;
use lineup_server::state::AppState;

fn test_server() -> TestServer {
    let state = AppState {
        // No live database: only routes that bypass isolation can succeed.
        db: DatabaseConnection::Disconnected,
        config: Arc::new(ServerConfig {
            database_url: String::new(),
            server_port: 0,
            public_prefixes: vec!["/healthz".to_owned(), "/readyz".to_owned()],
        }),
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn should_serve_liveness_without_tenant_resolution() {
    let server = test_server();
    server.get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_report_not_ready_when_datastore_down() {
    // Readiness pings the datastore; it still bypasses tenant isolation.
    let server = test_server();
    server
        .get("/readyz")
        .await
        .assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_fail_closed_when_datastore_unreachable() {
    let server = test_server();
    // Isolation runs before the handler and cannot resolve a tenant with the
    // datastore down; the request must never reach domain logic.
    let response = server.get("/queues").await;
    response.assert_status_internal_server_error();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["error"], "internal server error");
}
