//! Principal-tenant entitlement checks.

use serde_json::json;

use lineup_auth_types::principal::Principal;
use lineup_domain::event::{SecurityEvent, SecurityLevel};
use lineup_domain::tenant::Tenant;

use crate::domain::repository::MembershipRepository;
use crate::error::ServerError;
use crate::security::log::{
    CROSS_TENANT_ACCESS_ATTEMPT, CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT, LEGACY_MERCHANT_ACCESS,
    MISSING_USER_OR_TENANT_CONTEXT, SecurityEventSink, SecurityLog, VALID_MERCHANT_ACCESS,
    VALID_TENANT_ACCESS,
};

/// Decides whether an authenticated principal may act within the resolved
/// tenant. Every outcome, allowed or denied, is logged; denials are CRITICAL
/// and logged before the response is produced, so the audit trail survives
/// even a failed response.
#[derive(Debug, Clone)]
pub struct TenantValidator<M, S> {
    pub memberships: M,
    pub log: SecurityLog<S>,
}

impl<M, S> TenantValidator<M, S>
where
    M: MembershipRepository,
    S: SecurityEventSink,
{
    pub async fn validate(
        &self,
        principal: Option<&Principal>,
        tenant: Option<&Tenant>,
    ) -> Result<(), ServerError> {
        let (Some(principal), Some(tenant)) = (principal, tenant) else {
            self.log
                .critical(
                    MISSING_USER_OR_TENANT_CONTEXT,
                    json!({
                        "has_principal": principal.is_some(),
                        "has_tenant": tenant.is_some(),
                    }),
                )
                .await;
            return Err(ServerError::TenantAccessDenied);
        };

        match principal {
            Principal::Merchant {
                id,
                tenant_id,
                business_name,
            } => match tenant_id {
                Some(own) if *own == tenant.id => {
                    self.log
                        .emit(
                            SecurityEvent::new(
                                SecurityLevel::Info,
                                VALID_MERCHANT_ACCESS,
                                json!({"merchant_id": id, "tenant_id": tenant.id}),
                            )
                            .with_merchant(*id),
                        )
                        .await;
                    Ok(())
                }
                // Pre-multi-tenancy merchant: allowed everywhere, tracked
                // for eventual migration.
                None => {
                    self.log
                        .emit(
                            SecurityEvent::new(
                                SecurityLevel::Warning,
                                LEGACY_MERCHANT_ACCESS,
                                json!({
                                    "merchant_id": id,
                                    "business_name": business_name,
                                    "accessed_tenant_id": tenant.id,
                                }),
                            )
                            .with_merchant(*id),
                        )
                        .await;
                    Ok(())
                }
                Some(own) => {
                    self.log
                        .emit(
                            SecurityEvent::new(
                                SecurityLevel::Critical,
                                CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT,
                                json!({
                                    "merchant_id": id,
                                    "merchant_tenant_id": own,
                                    "requested_tenant_id": tenant.id,
                                }),
                            )
                            .with_merchant(*id),
                        )
                        .await;
                    Err(ServerError::MerchantAccessDenied)
                }
            },
            Principal::TenantUser { id, .. } => {
                match self.memberships.find_active(*id, tenant.id).await? {
                    Some(membership) => {
                        self.log
                            .emit(
                                SecurityEvent::new(
                                    SecurityLevel::Info,
                                    VALID_TENANT_ACCESS,
                                    json!({
                                        "user_id": id,
                                        "tenant_id": tenant.id,
                                        "role": membership.role,
                                    }),
                                )
                                .with_user(*id),
                            )
                            .await;
                        Ok(())
                    }
                    None => {
                        self.log
                            .emit(
                                SecurityEvent::new(
                                    SecurityLevel::Critical,
                                    CROSS_TENANT_ACCESS_ATTEMPT,
                                    json!({"user_id": id, "requested_tenant_id": tenant.id}),
                                )
                                .with_user(*id),
                            )
                            .await;
                        Err(ServerError::TenantAccessDenied)
                    }
                }
            }
        }
    }
}
