use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lineup_domain::pagination::PageRequest;

use crate::domain::types::{Merchant, MerchantUpdate};
use crate::error::ServerError;
use crate::security::middleware::TenantContext;
use crate::state::AppState;
use crate::usecase::merchant::{
    CreateMerchantInput, CreateMerchantUseCase, DeactivateMerchantUseCase, GetMerchantUseCase,
    ListMerchantsUseCase, TransferMerchantUseCase, UpdateMerchantUseCase,
};

#[derive(Serialize)]
pub struct MerchantResponse {
    pub id: String,
    pub email: String,
    pub business_name: String,
    pub tenant_id: Option<String>,
    pub is_active: bool,
    pub phone: Option<String>,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "lineup_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Merchant> for MerchantResponse {
    fn from(m: Merchant) -> Self {
        Self {
            id: m.id.to_string(),
            email: m.email,
            business_name: m.business_name,
            tenant_id: m.tenant_id.map(|id| id.to_string()),
            is_active: m.is_active,
            phone: m.phone,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ── POST /merchants ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateMerchantRequest {
    pub email: String,
    pub business_name: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

pub async fn create_merchant(
    context: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateMerchantRequest>,
) -> Result<(StatusCode, Json<MerchantResponse>), ServerError> {
    let usecase = CreateMerchantUseCase {
        merchants: state.merchant_repo(),
    };
    let merchant = usecase
        .execute(
            CreateMerchantInput {
                email: body.email,
                business_name: body.business_name,
                password_hash: body.password_hash,
                phone: body.phone,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(merchant.into())))
}

// ── GET /merchants/{id} ──────────────────────────────────────────────────────

pub async fn get_merchant(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MerchantResponse>, ServerError> {
    let usecase = GetMerchantUseCase {
        merchants: state.merchant_repo(),
        log: state.security_log(),
    };
    let merchant = usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(Json(merchant.into()))
}

// ── GET /merchants ───────────────────────────────────────────────────────────

pub async fn get_merchants(
    context: TenantContext,
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<MerchantResponse>>, ServerError> {
    let usecase = ListMerchantsUseCase {
        merchants: state.merchant_repo(),
    };
    let merchants = usecase
        .execute(page.clamped(), Some(context.tenant_id))
        .await?;
    Ok(Json(merchants.into_iter().map(Into::into).collect()))
}

// ── PATCH /merchants/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMerchantRequest {
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn update_merchant(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMerchantRequest>,
) -> Result<StatusCode, ServerError> {
    let usecase = UpdateMerchantUseCase {
        merchants: state.merchant_repo(),
        log: state.security_log(),
    };
    usecase
        .execute(
            id,
            MerchantUpdate {
                business_name: body.business_name,
                phone: body.phone,
                is_active: body.is_active,
            },
            Some(context.tenant_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /merchants/{id} ───────────────────────────────────────────────────

pub async fn deactivate_merchant(
    context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let usecase = DeactivateMerchantUseCase {
        merchants: state.merchant_repo(),
        log: state.security_log(),
    };
    usecase.execute(id, Some(context.tenant_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /merchants/{id}/transfer ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TransferMerchantRequest {
    pub tenant_id: Uuid,
}

pub async fn transfer_merchant(
    _context: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransferMerchantRequest>,
) -> Result<StatusCode, ServerError> {
    let usecase = TransferMerchantUseCase {
        merchants: state.merchant_repo(),
        tenants: state.tenant_repo(),
        log: state.security_log(),
    };
    usecase.execute(id, body.tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
