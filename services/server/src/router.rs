use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use lineup_core::health::healthz;
use lineup_core::middleware::request_id_layer;

use crate::handlers::{
    health::readyz,
    merchant::{
        create_merchant, deactivate_merchant, get_merchant, get_merchants, transfer_merchant,
        update_merchant,
    },
    queue::{
        call_next, create_queue, delete_queue, get_entries, get_queue, get_queues, join_queue,
        update_entry, update_queue,
    },
    webchat::{close_session, get_queue_sessions, get_session, start_session},
};
use crate::security::middleware::tenant_isolation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Merchants
        .route("/merchants", post(create_merchant))
        .route("/merchants", get(get_merchants))
        .route("/merchants/{id}", get(get_merchant))
        .route("/merchants/{id}", patch(update_merchant))
        .route("/merchants/{id}", delete(deactivate_merchant))
        .route("/merchants/{id}/transfer", post(transfer_merchant))
        // Queues
        .route("/queues", post(create_queue))
        .route("/queues", get(get_queues))
        .route("/queues/{id}", get(get_queue))
        .route("/queues/{id}", patch(update_queue))
        .route("/queues/{id}", delete(delete_queue))
        // Queue entries
        .route("/queues/{id}/entries", post(join_queue))
        .route("/queues/{id}/entries", get(get_entries))
        .route("/queues/{id}/call-next", post(call_next))
        .route("/entries/{id}", patch(update_entry))
        // Web chat
        .route("/webchat/sessions", post(start_session))
        .route("/webchat/sessions/{id}", get(get_session))
        .route("/webchat/sessions/{id}", delete(close_session))
        .route("/queues/{id}/webchat/sessions", get(get_queue_sessions))
        // Isolation runs before every handler; health routes bypass it via
        // the configured public prefixes.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_isolation,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
