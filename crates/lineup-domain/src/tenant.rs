//! Tenant identity and scoping types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isolated customer organization; root of the data-ownership hierarchy.
///
/// Every tenant-owned row traces back to exactly one tenant, or carries no
/// tenant at all ("legacy" rows created before multi-tenancy, visible across
/// all tenants for compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    /// URL-safe label used for subdomain resolution (`<slug>.example.com`).
    pub slug: String,
    /// Registered custom domain, if the tenant serves traffic on its own host.
    pub domain: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Membership row granting a non-merchant user access to one tenant.
///
/// A user belongs to multiple tenants only through distinct rows; the absence
/// of an active row for (user, tenant) means access is denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMembership {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: String,
    pub is_active: bool,
}

/// The tenant binding carried by every repository read and write.
///
/// `Unscoped` is the explicit backward-compatibility escape hatch: queries run
/// unfiltered and the data layer logs a warning. It is never the silent
/// default — callers opt into it by omitting a tenant id at the service
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantScope {
    Scoped(Uuid),
    Unscoped,
}

impl TenantScope {
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Self::Scoped(id) => Some(*id),
            Self::Unscoped => None,
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Scoped(_))
    }
}

impl From<Option<Uuid>> for TenantScope {
    fn from(id: Option<Uuid>) -> Self {
        match id {
            Some(id) => Self::Scoped(id),
            None => Self::Unscoped,
        }
    }
}
