use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lineup_domain::pagination::PageRequest;

use crate::domain::types::{EntryStatus, NewEntry, Queue, QueueEntry, QueueUpdate};
use crate::error::ServerError;
use crate::security::middleware::TenantContext;
use crate::state::AppState;
use crate::usecase::queue::{
    CallNextUseCase, CreateQueueInput, CreateQueueUseCase, DeleteQueueUseCase, GetQueueUseCase,
    JoinQueueUseCase, ListEntriesUseCase, ListQueuesUseCase, UpdateEntryStatusUseCase,
    UpdateQueueUseCase,
};

#[derive(Serialize)]
pub struct QueueResponse {
    pub id: String,
    pub merchant_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub max_size: Option<i32>,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Queue> for QueueResponse {
    fn from(q: Queue) -> Self {
        Self {
            id: q.id.to_string(),
            merchant_id: q.merchant_id.to_string(),
            name: q.name,
            description: q.description,
            is_active: q.is_active,
            max_size: q.max_size,
            created_at: q.created_at,
            updated_at: q.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct EntryResponse {
    pub id: String,
    pub queue_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub position: i32,
    pub status: EntryStatus,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub called_at: Option<chrono::DateTime<chrono::Utc>>,
    pub served_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<QueueEntry> for EntryResponse {
    fn from(e: QueueEntry) -> Self {
        Self {
            id: e.id.to_string(),
            queue_id: e.queue_id.to_string(),
            customer_name: e.customer_name,
            customer_phone: e.customer_phone,
            position: e.position,
            status: e.status,
            created_at: e.created_at,
            called_at: e.called_at,
            served_at: e.served_at,
        }
    }
}

// ── POST /queues ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateQueueRequest {
    pub merchant_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub max_size: Option<i32>,
}

pub async fn create_queue(
    context: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateQueueRequest>,
) -> Result<(StatusCode, Json<QueueResponse>), ServerError> {
    let usecase = CreateQueueUseCase {
        queues: state.queue_repo(),
        merchants: state.merchant_repo(),
    };
    let queue = usecase
        .execute(
            CreateQueueInput {
                merchant_id: body.merchant_id,
                name: body.name,
                description: body.description,
                max_size: body.max_size,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(queue.into())))
}

// ── GET /queues/{id} ─────────────────────────────────────────────────────────

pub async fn get_queue(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QueueResponse>, ServerError> {
    let usecase = GetQueueUseCase {
        queues: state.queue_repo(),
    };
    let queue = usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(Json(queue.into()))
}

// ── GET /queues ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListQueuesQuery {
    pub merchant_id: Option<Uuid>,
}

pub async fn get_queues(
    context: TenantContext,
    State(state): State<AppState>,
    Query(filter): Query<ListQueuesQuery>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<QueueResponse>>, ServerError> {
    let usecase = ListQueuesUseCase {
        queues: state.queue_repo(),
    };
    let queues = usecase
        .execute(filter.merchant_id, page.clamped(), Some(context.tenant_id))
        .await?;
    Ok(Json(queues.into_iter().map(Into::into).collect()))
}

// ── PATCH /queues/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateQueueRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub max_size: Option<i32>,
}

pub async fn update_queue(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateQueueRequest>,
) -> Result<StatusCode, ServerError> {
    let usecase = UpdateQueueUseCase {
        queues: state.queue_repo(),
    };
    usecase
        .execute(
            id,
            QueueUpdate {
                name: body.name,
                description: body.description,
                is_active: body.is_active,
                max_size: body.max_size,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /queues/{id} ──────────────────────────────────────────────────────

pub async fn delete_queue(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let usecase = DeleteQueueUseCase {
        queues: state.queue_repo(),
    };
    usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /queues/{id}/entries ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct JoinQueueRequest {
    pub customer_name: String,
    pub customer_phone: Option<String>,
}

pub async fn join_queue(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JoinQueueRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ServerError> {
    let usecase = JoinQueueUseCase {
        queues: state.queue_repo(),
        entries: state.entry_repo(),
    };
    let entry = usecase
        .execute(
            id,
            NewEntry {
                customer_name: body.customer_name,
                customer_phone: body.customer_phone,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

// ── GET /queues/{id}/entries ─────────────────────────────────────────────────

pub async fn get_entries(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<EntryResponse>>, ServerError> {
    let usecase = ListEntriesUseCase {
        queues: state.queue_repo(),
        entries: state.entry_repo(),
    };
    let entries = usecase
        .execute(id, page.clamped(), Some(context.tenant_id))
        .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

// ── POST /queues/{id}/call-next ──────────────────────────────────────────────

pub async fn call_next(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ServerError> {
    let usecase = CallNextUseCase {
        queues: state.queue_repo(),
        entries: state.entry_repo(),
    };
    let entry = usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(Json(entry.into()))
}

// ── PATCH /entries/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub status: EntryStatus,
}

pub async fn update_entry(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ServerError> {
    let usecase = UpdateEntryStatusUseCase {
        entries: state.entry_repo(),
    };
    let entry = usecase
        .execute(id, body.status, Some(context.tenant_id))
        .await?;
    Ok(Json(entry.into()))
}
