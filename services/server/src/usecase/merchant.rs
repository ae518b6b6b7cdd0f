//! Merchant operations.
//!
//! Every operation takes an optional trailing tenant id. When present, all
//! persistence goes through the tenant scope; when absent the operation
//! runs in explicit legacy mode and the data layer logs that fact.

use serde_json::json;
use uuid::Uuid;

use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::TenantScope;

use crate::domain::repository::{MerchantRepository, TenantRepository};
use crate::domain::types::{Merchant, MerchantUpdate, NewMerchant};
use crate::error::ServerError;
use crate::security::log::{
    LEGACY_MERCHANT_ACCESS, MERCHANT_TENANT_TRANSFERRED, SecurityEventSink, SecurityLog,
};

/// Surface a legacy (untenanted) merchant read for migration tracking.
async fn log_legacy_access<S: SecurityEventSink>(
    log: &SecurityLog<S>,
    merchant: &Merchant,
    scope: TenantScope,
) {
    if merchant.tenant_id.is_none() && scope.is_scoped() {
        log.warning(
            LEGACY_MERCHANT_ACCESS,
            json!({
                "merchant_id": merchant.id,
                "accessed_tenant_id": scope.tenant_id(),
            }),
        )
        .await;
    }
}

// ── CreateMerchant ───────────────────────────────────────────────────────────

pub struct CreateMerchantInput {
    pub email: String,
    pub business_name: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

pub struct CreateMerchantUseCase<R: MerchantRepository> {
    pub merchants: R,
}

impl<R: MerchantRepository> CreateMerchantUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateMerchantInput,
        tenant_id: Option<Uuid>,
    ) -> Result<Merchant, ServerError> {
        if input.business_name.trim().is_empty() || input.password_hash.is_empty() {
            return Err(ServerError::MissingData);
        }
        if !input.email.contains('@') {
            return Err(ServerError::InvalidEmail);
        }
        self.merchants
            .create_tagged(
                TenantScope::from(tenant_id),
                &NewMerchant {
                    email: input.email,
                    business_name: input.business_name,
                    password_hash: input.password_hash,
                    phone: input.phone,
                },
            )
            .await
    }
}

// ── GetMerchant ──────────────────────────────────────────────────────────────

pub struct GetMerchantUseCase<R: MerchantRepository, S: SecurityEventSink> {
    pub merchants: R,
    pub log: SecurityLog<S>,
}

impl<R: MerchantRepository, S: SecurityEventSink> GetMerchantUseCase<R, S> {
    pub async fn execute(
        &self,
        id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<Merchant, ServerError> {
        let scope = TenantScope::from(tenant_id);
        let merchant = self
            .merchants
            .find_scoped(scope, id)
            .await?
            .ok_or(ServerError::MerchantNotFound)?;
        log_legacy_access(&self.log, &merchant, scope).await;
        Ok(merchant)
    }
}

// ── ListMerchants ────────────────────────────────────────────────────────────

pub struct ListMerchantsUseCase<R: MerchantRepository> {
    pub merchants: R,
}

impl<R: MerchantRepository> ListMerchantsUseCase<R> {
    pub async fn execute(
        &self,
        page: PageRequest,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Merchant>, ServerError> {
        self.merchants
            .list_scoped(TenantScope::from(tenant_id), page)
            .await
    }
}

// ── UpdateMerchant ───────────────────────────────────────────────────────────

pub struct UpdateMerchantUseCase<R: MerchantRepository, S: SecurityEventSink> {
    pub merchants: R,
    pub log: SecurityLog<S>,
}

impl<R: MerchantRepository, S: SecurityEventSink> UpdateMerchantUseCase<R, S> {
    pub async fn execute(
        &self,
        id: Uuid,
        changes: MerchantUpdate,
        tenant_id: Option<Uuid>,
    ) -> Result<(), ServerError> {
        if changes.is_empty() {
            return Err(ServerError::MissingData);
        }
        let scope = TenantScope::from(tenant_id);
        // Scoped re-fetch first: a foreign row reads as absent, so the
        // caller gets an explicit not-found instead of a silent no-op.
        let merchant = self
            .merchants
            .find_scoped(scope, id)
            .await?
            .ok_or(ServerError::MerchantNotFound)?;
        log_legacy_access(&self.log, &merchant, scope).await;
        if !self.merchants.update_scoped(scope, id, &changes).await? {
            return Err(ServerError::MerchantNotFound);
        }
        Ok(())
    }
}

// ── DeactivateMerchant ───────────────────────────────────────────────────────

pub struct DeactivateMerchantUseCase<R: MerchantRepository, S: SecurityEventSink> {
    pub merchants: R,
    pub log: SecurityLog<S>,
}

impl<R: MerchantRepository, S: SecurityEventSink> DeactivateMerchantUseCase<R, S> {
    pub async fn execute(&self, id: Uuid, tenant_id: Option<Uuid>) -> Result<(), ServerError> {
        let scope = TenantScope::from(tenant_id);
        let merchant = self
            .merchants
            .find_scoped(scope, id)
            .await?
            .ok_or(ServerError::MerchantNotFound)?;
        log_legacy_access(&self.log, &merchant, scope).await;
        if !self.merchants.deactivate_scoped(scope, id).await? {
            return Err(ServerError::MerchantNotFound);
        }
        Ok(())
    }
}

// ── TransferMerchant ─────────────────────────────────────────────────────────

/// The explicit administrative path for moving a merchant between tenants.
/// Normal updates never touch `tenant_id`.
pub struct TransferMerchantUseCase<R: MerchantRepository, T: TenantRepository, S: SecurityEventSink>
{
    pub merchants: R,
    pub tenants: T,
    pub log: SecurityLog<S>,
}

impl<R: MerchantRepository, T: TenantRepository, S: SecurityEventSink>
    TransferMerchantUseCase<R, T, S>
{
    pub async fn execute(&self, merchant_id: Uuid, tenant_id: Uuid) -> Result<(), ServerError> {
        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .filter(|t| t.is_active)
            .ok_or(ServerError::TenantNotFound)?;
        let merchant = self
            .merchants
            .find_scoped(TenantScope::Unscoped, merchant_id)
            .await?
            .ok_or(ServerError::MerchantNotFound)?;
        if !self.merchants.transfer_tenant(merchant_id, tenant.id).await? {
            return Err(ServerError::MerchantNotFound);
        }
        self.log
            .warning(
                MERCHANT_TENANT_TRANSFERRED,
                json!({
                    "merchant_id": merchant_id,
                    "from_tenant_id": merchant.tenant_id,
                    "to_tenant_id": tenant.id,
                }),
            )
            .await;
        Ok(())
    }
}
