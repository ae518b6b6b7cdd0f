use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lineup_domain::pagination::PageRequest;

use crate::domain::types::{ChatSession, ChatStatus};
use crate::error::ServerError;
use crate::security::middleware::TenantContext;
use crate::state::AppState;
use crate::usecase::webchat::{
    CloseChatSessionUseCase, GetChatSessionUseCase, ListChatSessionsUseCase,
    StartChatSessionInput, StartChatSessionUseCase,
};

#[derive(Serialize)]
pub struct ChatSessionResponse {
    pub id: String,
    pub queue_id: String,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
    pub status: ChatStatus,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<ChatSession> for ChatSessionResponse {
    fn from(s: ChatSession) -> Self {
        Self {
            id: s.id.to_string(),
            queue_id: s.queue_id.to_string(),
            visitor_name: s.visitor_name,
            visitor_phone: s.visitor_phone,
            status: s.status,
            created_at: s.created_at,
            closed_at: s.closed_at,
        }
    }
}

// ── POST /webchat/sessions ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartChatSessionRequest {
    pub queue_id: Uuid,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
}

pub async fn start_session(
    context: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<StartChatSessionRequest>,
) -> Result<(StatusCode, Json<ChatSessionResponse>), ServerError> {
    let usecase = StartChatSessionUseCase {
        queues: state.queue_repo(),
        chats: state.chat_repo(),
    };
    let session = usecase
        .execute(
            StartChatSessionInput {
                queue_id: body.queue_id,
                visitor_name: body.visitor_name,
                visitor_phone: body.visitor_phone,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

// ── GET /webchat/sessions/{id} ───────────────────────────────────────────────

pub async fn get_session(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatSessionResponse>, ServerError> {
    let usecase = GetChatSessionUseCase {
        chats: state.chat_repo(),
    };
    let session = usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(Json(session.into()))
}

// ── GET /queues/{id}/webchat/sessions ────────────────────────────────────────

pub async fn get_queue_sessions(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<ChatSessionResponse>>, ServerError> {
    let usecase = ListChatSessionsUseCase {
        queues: state.queue_repo(),
        chats: state.chat_repo(),
    };
    let sessions = usecase
        .execute(id, page.clamped(), Some(context.tenant_id))
        .await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

// ── DELETE /webchat/sessions/{id} ────────────────────────────────────────────

pub async fn close_session(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let usecase = CloseChatSessionUseCase {
        chats: state.chat_repo(),
    };
    usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
