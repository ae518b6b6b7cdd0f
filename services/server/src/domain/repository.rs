#![allow(async_fn_in_trait)]

use uuid::Uuid;

use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::{Tenant, TenantMembership, TenantScope};

use crate::domain::types::{
    ChatSession, Merchant, MerchantUpdate, NewChatSession, NewEntry, NewMerchant, NewQueue, Queue,
    QueueEntry, QueueUpdate,
};
use crate::error::ServerError;

/// Repository for tenant records, used by the resolver.
///
/// Lookups return tenants regardless of `is_active` so the resolver can
/// distinguish an inactive tenant (logged CRITICAL) from a missing one.
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, ServerError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, ServerError>;
    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, ServerError>;
    /// Oldest active tenant, for single-tenant deployments.
    async fn find_oldest_active(&self) -> Result<Option<Tenant>, ServerError>;
}

/// Repository for tenant-user membership rows, used by the validator.
pub trait MembershipRepository: Send + Sync {
    /// Active membership for (user, tenant), if any. Inactive rows are
    /// indistinguishable from absent ones.
    async fn find_active(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<TenantMembership>, ServerError>;
}

/// Tenant-scoped repository for merchants.
///
/// Every method takes the caller's [`TenantScope`]: scoped reads are
/// constrained to `tenant_id = scope OR tenant_id IS NULL` (legacy rows stay
/// visible), scoped writes are tagged with the scope's tenant id regardless
/// of caller input. A read of a foreign tenant's row returns `None` — never
/// an error.
pub trait MerchantRepository: Send + Sync {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Merchant>, ServerError>;

    async fn list_scoped(
        &self,
        scope: TenantScope,
        page: PageRequest,
    ) -> Result<Vec<Merchant>, ServerError>;

    /// Insert a merchant tagged with the scope's tenant id.
    async fn create_tagged(
        &self,
        scope: TenantScope,
        merchant: &NewMerchant,
    ) -> Result<Merchant, ServerError>;

    /// Apply `changes` to a row visible through the scope. Returns `false`
    /// when no such row exists.
    async fn update_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
        changes: &MerchantUpdate,
    ) -> Result<bool, ServerError>;

    async fn deactivate_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError>;

    /// Explicit administrative reassignment of a merchant's tenant. The one
    /// write path that crosses tenants; deliberately unscoped.
    async fn transfer_tenant(&self, id: Uuid, tenant_id: Uuid) -> Result<bool, ServerError>;
}

/// Tenant-scoped repository for queues.
///
/// Queues carry no tenant column; the scope filter traverses
/// queue → merchant and applies the merchant-level tenant condition there.
pub trait QueueRepository: Send + Sync {
    async fn find_scoped(&self, scope: TenantScope, id: Uuid)
    -> Result<Option<Queue>, ServerError>;

    async fn list_scoped(
        &self,
        scope: TenantScope,
        merchant_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Queue>, ServerError>;

    /// Ownership of the target merchant is checked by the caller through a
    /// scoped re-fetch before this runs.
    async fn create(&self, queue: &NewQueue) -> Result<Queue, ServerError>;

    async fn update_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
        changes: &QueueUpdate,
    ) -> Result<bool, ServerError>;

    async fn delete_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError>;
}

/// Tenant-scoped repository for queue entries (scope traverses
/// entry → queue → merchant).
pub trait EntryRepository: Send + Sync {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<QueueEntry>, ServerError>;

    async fn list_scoped(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<QueueEntry>, ServerError>;

    /// Number of entries currently waiting, for max-size enforcement.
    async fn count_waiting(&self, queue_id: Uuid) -> Result<u64, ServerError>;

    /// Append an entry at the next free position.
    async fn create(&self, queue_id: Uuid, entry: &NewEntry) -> Result<QueueEntry, ServerError>;

    /// Oldest waiting entry in the queue, visible through the scope.
    async fn find_next_waiting(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
    ) -> Result<Option<QueueEntry>, ServerError>;

    /// Move an entry to `status`, stamping `called_at`/`served_at` as
    /// appropriate. Returns `false` when the row is not visible.
    async fn set_status(
        &self,
        scope: TenantScope,
        id: Uuid,
        status: crate::domain::types::EntryStatus,
    ) -> Result<bool, ServerError>;
}

/// Tenant-scoped repository for web-chat sessions (scope traverses
/// session → queue → merchant).
pub trait ChatSessionRepository: Send + Sync {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<ChatSession>, ServerError>;

    async fn list_scoped(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<ChatSession>, ServerError>;

    async fn create(&self, session: &NewChatSession) -> Result<ChatSession, ServerError>;

    /// Close a session visible through the scope. Returns `false` when the
    /// row is not visible.
    async fn close_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError>;
}
