use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use lineup_server::config::ServerConfig;
use lineup_server::router::build_router;
use lineup_server::state::AppState;

#[tokio::main]
async fn main() {
    lineup_core::tracing::init_tracing();

    let config = ServerConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let http_addr = format!("0.0.0.0:{}", config.server_port);
    let state = AppState {
        db,
        config: Arc::new(config),
    };

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("server listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
