//! Tenant resolution from request signals.

use serde_json::json;
use uuid::Uuid;

use lineup_auth_types::principal::Principal;
use lineup_domain::tenant::Tenant;

use crate::domain::repository::TenantRepository;
use crate::error::ServerError;
use crate::security::log::{
    self, CROSS_TENANT_HEADER_ATTEMPT, SecurityEventSink, SecurityLog, TENANT_INACTIVE,
    TENANT_RESOLVED,
};

/// Raw signals extracted from the request by the middleware.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSignals {
    /// Value of the `X-Tenant-ID` header, if present.
    pub tenant_header: Option<String>,
    /// Value of the `Host` header, if present (may carry a port).
    pub host: Option<String>,
}

/// Which signal produced the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    Header,
    Subdomain,
    CustomDomain,
    Principal,
    Fallback,
}

impl ResolutionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Subdomain => "subdomain",
            Self::CustomDomain => "custom_domain",
            Self::Principal => "principal",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedTenant {
    pub tenant: Tenant,
    pub method: ResolutionMethod,
}

/// Resolves the active tenant for a request through a priority chain:
/// explicit header, subdomain slug, custom domain, the principal's own
/// tenant, and finally the oldest active tenant for single-tenant
/// deployments. First successful fetch wins.
///
/// The `X-Tenant-ID` header is never trusted over an authenticated
/// identity: when the principal carries a different tenant, the header is
/// overridden and a CRITICAL event is recorded.
#[derive(Debug, Clone)]
pub struct TenantResolver<T, S> {
    pub tenants: T,
    pub log: SecurityLog<S>,
}

impl<T, S> TenantResolver<T, S>
where
    T: TenantRepository,
    S: SecurityEventSink,
{
    /// Resolve exactly one tenant or fail with `TenantNotFound`.
    ///
    /// Emits exactly one outcome event per call (`TENANT_RESOLVED`,
    /// `TENANT_NOT_FOUND`, or `TENANT_INACTIVE`); the header-override
    /// CRITICAL event is in addition to the outcome.
    pub async fn resolve(
        &self,
        signals: &ResolutionSignals,
        principal: Option<&Principal>,
    ) -> Result<ResolvedTenant, ServerError> {
        let mut candidate_id: Option<Uuid> = None;
        let mut candidate_slug: Option<String> = None;
        let mut method = ResolutionMethod::Header;

        // 1. Explicit tenant header, unless an authenticated principal
        //    contradicts it.
        if let Some(raw) = signals.tenant_header.as_deref() {
            // A malformed header is ignored and the chain continues.
            if let Ok(header_id) = raw.parse::<Uuid>() {
                let principal_tenant = principal.and_then(|p| p.tenant_id());
                match principal_tenant {
                    Some(own) if own != header_id => {
                        let mut event = lineup_domain::event::SecurityEvent::new(
                            lineup_domain::event::SecurityLevel::Critical,
                            CROSS_TENANT_HEADER_ATTEMPT,
                            json!({
                                "header_tenant_id": header_id,
                                "principal_tenant_id": own,
                                "principal_kind": principal.map(|p| p.kind()),
                            }),
                        );
                        if let Some(p) = principal {
                            event = match p {
                                Principal::Merchant { id, .. } => event.with_merchant(*id),
                                Principal::TenantUser { id, .. } => event.with_user(*id),
                            };
                        }
                        self.log.emit(event).await;
                        candidate_id = Some(own);
                    }
                    _ => candidate_id = Some(header_id),
                }
            }
        }

        // 2. Subdomain slug.
        if candidate_id.is_none() && candidate_slug.is_none() {
            if let Some(host) = signals.host.as_deref() {
                if let Some(slug) = subdomain_slug(host) {
                    candidate_slug = Some(slug);
                    method = ResolutionMethod::Subdomain;
                }
            }
        }

        // 3. Custom-domain mapping.
        let mut fetched: Option<Tenant> = None;
        if candidate_id.is_none() && candidate_slug.is_none() {
            if let Some(host) = signals.host.as_deref() {
                fetched = self.tenants.find_by_domain(hostname(host)).await?;
                if fetched.is_some() {
                    method = ResolutionMethod::CustomDomain;
                }
            }
        }

        // 4. Fetch the candidate from steps 1–2.
        if fetched.is_none() {
            if let Some(id) = candidate_id {
                fetched = self.tenants.find_by_id(id).await?;
            } else if let Some(slug) = candidate_slug.as_deref() {
                fetched = self.tenants.find_by_slug(slug).await?;
            }
            // A candidate that fetched an inactive tenant fails here rather
            // than falling through to weaker signals.
            if let Some(tenant) = &fetched {
                if !tenant.is_active {
                    return self.fail_inactive(tenant).await;
                }
            }
        }

        // 5. The principal's own tenant.
        if fetched.is_none() {
            if let Some(own) = principal.and_then(|p| p.tenant_id()) {
                fetched = self.tenants.find_by_id(own).await?;
                if fetched.is_some() {
                    method = ResolutionMethod::Principal;
                }
            }
        }

        // 6. Single-tenant fallback.
        if fetched.is_none() {
            fetched = self.tenants.find_oldest_active().await?;
            if fetched.is_some() {
                method = ResolutionMethod::Fallback;
            }
        }

        match fetched {
            Some(tenant) if !tenant.is_active => self.fail_inactive(&tenant).await,
            Some(tenant) => {
                self.log
                    .info(
                        TENANT_RESOLVED,
                        json!({
                            "method": method.as_str(),
                            "tenant_id": tenant.id,
                            "slug": tenant.slug,
                        }),
                    )
                    .await;
                Ok(ResolvedTenant { tenant, method })
            }
            None => {
                self.log
                    .critical(
                        log::TENANT_NOT_FOUND,
                        json!({
                            "tenant_header": signals.tenant_header,
                            "host": signals.host,
                        }),
                    )
                    .await;
                Err(ServerError::TenantNotFound)
            }
        }
    }

    /// Inactive tenants are indistinguishable from missing ones externally;
    /// only the log tells them apart.
    async fn fail_inactive(&self, tenant: &Tenant) -> Result<ResolvedTenant, ServerError> {
        self.log
            .critical(
                TENANT_INACTIVE,
                json!({"tenant_id": tenant.id, "slug": tenant.slug}),
            )
            .await;
        Err(ServerError::TenantNotFound)
    }
}

/// Strip an optional port from a `Host` header value.
fn hostname(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// Tenant slug candidate from the subdomain chain: the last label before the
/// registrable domain. `a.b.example.com` → `b`; `example.com` → none.
fn subdomain_slug(host: &str) -> Option<String> {
    let name = hostname(host);
    let labels: Vec<&str> = name.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 3 {
        return None;
    }
    labels[..labels.len() - 2].last().map(|s| (*s).to_owned())
}
