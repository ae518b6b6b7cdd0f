//! Gateway-injected principal headers.
//!
//! The upstream auth layer authenticates the caller and injects identity
//! headers before any service sees the request. The two principal shapes are
//! an explicit sum type here — no structural guessing downstream.

use axum::extract::FromRequestParts;
use http::HeaderMap;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

/// The authenticated actor on a request.
///
/// A merchant "is" a tenant member through its own `tenant_id` column
/// (nullable for legacy accounts); a tenant user is a member only through a
/// `tenant_users` row, checked at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Merchant {
        id: Uuid,
        tenant_id: Option<Uuid>,
        business_name: String,
    },
    TenantUser {
        id: Uuid,
        tenant_id: Option<Uuid>,
    },
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Merchant { id, .. } | Self::TenantUser { id, .. } => *id,
        }
    }

    /// The tenant the principal itself claims, if any.
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Self::Merchant { tenant_id, .. } | Self::TenantUser { tenant_id, .. } => *tenant_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Merchant { .. } => "merchant",
            Self::TenantUser { .. } => "tenant_user",
        }
    }

    /// Parse the gateway identity headers, if present.
    ///
    /// `x-lineup-merchant-id` marks a merchant principal (with
    /// `x-lineup-business-name`); `x-lineup-user-id` marks a tenant user.
    /// Both read the optional `x-lineup-tenant-id`. A merchant header takes
    /// precedence if the gateway ever sent both. Returns `None` for
    /// unauthenticated requests — absence of identity is not an error here.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let tenant_id = header_uuid(headers, "x-lineup-tenant-id");

        if let Some(id) = header_uuid(headers, "x-lineup-merchant-id") {
            let business_name = headers
                .get("x-lineup-business-name")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            return Some(Self::Merchant {
                id,
                tenant_id,
                business_name,
            });
        }

        header_uuid(headers, "x-lineup-user-id").map(|id| Self::TenantUser { id, tenant_id })
    }
}

fn header_uuid(headers: &HeaderMap, name: &str) -> Option<Uuid> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Uuid>().ok())
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously and return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        // The isolation middleware stores the parsed principal as an
        // extension; fall back to the raw headers for routes mounted
        // before it.
        let principal = parts
            .extensions
            .get::<Principal>()
            .cloned()
            .or_else(|| Principal::from_headers(&parts.headers));

        async move { principal.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
