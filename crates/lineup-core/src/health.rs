use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness only. Readiness is service-specific
/// (it should ping the service's own backing stores) and lives with each
/// service's handlers.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
