//! Per-request tenant isolation.
//!
//! resolve tenant → attach to request context → validate principal →
//! reject or continue. Public paths bypass the whole chain.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

use lineup_auth_types::principal::Principal;
use lineup_domain::tenant::Tenant;

use crate::domain::repository::{MembershipRepository, TenantRepository};
use crate::error::ServerError;
use crate::security::log::{SecurityEventSink, SecurityLog, TENANT_ISOLATION_ERROR};
use crate::security::resolver::{ResolutionSignals, ResolvedTenant, TenantResolver};
use crate::security::validator::TenantValidator;
use crate::state::AppState;

/// Request extension attached after successful resolution.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
    pub tenant_id: Uuid,
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Present on every route behind the isolation middleware; a missing
    // extension means a route was wired outside it.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let context = parts.extensions.get::<TenantContext>().cloned();
        async move { context.ok_or(StatusCode::INTERNAL_SERVER_ERROR) }
    }
}

/// Resolver and validator run per request; no state outlives the call, so
/// concurrent requests for different tenants cannot observe each other.
#[derive(Debug, Clone)]
pub struct IsolationService<T, M, S> {
    pub resolver: TenantResolver<T, S>,
    pub validator: TenantValidator<M, S>,
    pub log: SecurityLog<S>,
}

impl<T, M, S> IsolationService<T, M, S>
where
    T: TenantRepository,
    M: MembershipRepository,
    S: SecurityEventSink,
{
    /// The full isolation chain for one request. Unauthenticated requests
    /// pass through after resolution; validation only runs when a principal
    /// is present.
    pub async fn run(
        &self,
        signals: &ResolutionSignals,
        principal: Option<&Principal>,
    ) -> Result<ResolvedTenant, ServerError> {
        let result = self.run_inner(signals, principal).await;
        if let Err(ServerError::Internal(e)) = &result {
            // The client sees a generic 500; the full failure is logged
            // CRITICAL with context before the response goes out.
            self.log
                .critical(TENANT_ISOLATION_ERROR, json!({"error": e.to_string()}))
                .await;
        }
        result
    }

    async fn run_inner(
        &self,
        signals: &ResolutionSignals,
        principal: Option<&Principal>,
    ) -> Result<ResolvedTenant, ServerError> {
        let resolved = self.resolver.resolve(signals, principal).await?;
        if principal.is_some() {
            self.validator
                .validate(principal, Some(&resolved.tenant))
                .await?;
        }
        Ok(resolved)
    }
}

/// axum middleware. Apply with
/// `middleware::from_fn_with_state(state, tenant_isolation)`.
pub async fn tenant_isolation(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if state
        .config
        .public_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
    {
        return next.run(req).await;
    }

    let principal = Principal::from_headers(req.headers());
    let signals = ResolutionSignals {
        tenant_header: header_string(req.headers(), "x-tenant-id"),
        host: header_string(req.headers(), "host"),
    };

    // Fresh service per request: scoped handles are never shared across
    // requests.
    let isolation = state.isolation();
    match isolation.run(&signals, principal.as_ref()).await {
        Ok(resolved) => {
            req.extensions_mut().insert(TenantContext {
                tenant_id: resolved.tenant.id,
                tenant: resolved.tenant,
            });
            if let Some(principal) = principal {
                req.extensions_mut().insert(principal);
            }
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

fn header_string(headers: &axum::http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
