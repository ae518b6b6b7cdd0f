//! Queue and queue-entry operations.
//!
//! Queues have no tenant column of their own; every ownership question is
//! answered by re-fetching the queue (or its merchant) through the caller's
//! scope before touching anything beneath it.

use uuid::Uuid;

use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::TenantScope;

use crate::domain::repository::{EntryRepository, MerchantRepository, QueueRepository};
use crate::domain::types::{
    EntryStatus, NewEntry, NewQueue, Queue, QueueEntry, QueueUpdate,
};
use crate::error::ServerError;

// ── CreateQueue ──────────────────────────────────────────────────────────────

pub struct CreateQueueInput {
    pub merchant_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub max_size: Option<i32>,
}

pub struct CreateQueueUseCase<Q: QueueRepository, M: MerchantRepository> {
    pub queues: Q,
    pub merchants: M,
}

impl<Q: QueueRepository, M: MerchantRepository> CreateQueueUseCase<Q, M> {
    pub async fn execute(
        &self,
        input: CreateQueueInput,
        tenant_id: Option<Uuid>,
    ) -> Result<Queue, ServerError> {
        let merchant_id = input.merchant_id.ok_or(ServerError::MerchantIdRequired)?;
        if input.name.trim().is_empty() {
            return Err(ServerError::MissingData);
        }
        let scope = TenantScope::from(tenant_id);
        // The merchant must be visible through the scope; a foreign merchant
        // id fails closed as not-found.
        self.merchants
            .find_scoped(scope, merchant_id)
            .await?
            .ok_or(ServerError::MerchantNotFound)?;
        self.queues
            .create(&NewQueue {
                merchant_id,
                name: input.name,
                description: input.description,
                max_size: input.max_size,
            })
            .await
    }
}

// ── GetQueue ─────────────────────────────────────────────────────────────────

pub struct GetQueueUseCase<Q: QueueRepository> {
    pub queues: Q,
}

impl<Q: QueueRepository> GetQueueUseCase<Q> {
    pub async fn execute(&self, id: Uuid, tenant_id: Option<Uuid>) -> Result<Queue, ServerError> {
        self.queues
            .find_scoped(TenantScope::from(tenant_id), id)
            .await?
            .ok_or(ServerError::QueueNotFound)
    }
}

// ── ListQueues ───────────────────────────────────────────────────────────────

pub struct ListQueuesUseCase<Q: QueueRepository> {
    pub queues: Q,
}

impl<Q: QueueRepository> ListQueuesUseCase<Q> {
    pub async fn execute(
        &self,
        merchant_id: Option<Uuid>,
        page: PageRequest,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<Queue>, ServerError> {
        self.queues
            .list_scoped(TenantScope::from(tenant_id), merchant_id, page)
            .await
    }
}

// ── UpdateQueue ──────────────────────────────────────────────────────────────

pub struct UpdateQueueUseCase<Q: QueueRepository> {
    pub queues: Q,
}

impl<Q: QueueRepository> UpdateQueueUseCase<Q> {
    pub async fn execute(
        &self,
        id: Uuid,
        changes: QueueUpdate,
        tenant_id: Option<Uuid>,
    ) -> Result<(), ServerError> {
        if changes.is_empty() {
            return Err(ServerError::MissingData);
        }
        let scope = TenantScope::from(tenant_id);
        if !self.queues.update_scoped(scope, id, &changes).await? {
            return Err(ServerError::QueueNotFound);
        }
        Ok(())
    }
}

// ── DeleteQueue ──────────────────────────────────────────────────────────────

pub struct DeleteQueueUseCase<Q: QueueRepository> {
    pub queues: Q,
}

impl<Q: QueueRepository> DeleteQueueUseCase<Q> {
    pub async fn execute(&self, id: Uuid, tenant_id: Option<Uuid>) -> Result<(), ServerError> {
        if !self
            .queues
            .delete_scoped(TenantScope::from(tenant_id), id)
            .await?
        {
            return Err(ServerError::QueueNotFound);
        }
        Ok(())
    }
}

// ── JoinQueue ────────────────────────────────────────────────────────────────

pub struct JoinQueueUseCase<Q: QueueRepository, E: EntryRepository> {
    pub queues: Q,
    pub entries: E,
}

impl<Q: QueueRepository, E: EntryRepository> JoinQueueUseCase<Q, E> {
    pub async fn execute(
        &self,
        queue_id: Uuid,
        entry: NewEntry,
        tenant_id: Option<Uuid>,
    ) -> Result<QueueEntry, ServerError> {
        if entry.customer_name.trim().is_empty() {
            return Err(ServerError::MissingData);
        }
        let scope = TenantScope::from(tenant_id);
        let queue = self
            .queues
            .find_scoped(scope, queue_id)
            .await?
            .ok_or(ServerError::QueueNotFound)?;
        if !queue.is_active {
            return Err(ServerError::QueueClosed);
        }
        if let Some(max) = queue.max_size {
            let waiting = self.entries.count_waiting(queue.id).await?;
            if waiting >= max as u64 {
                return Err(ServerError::QueueFull);
            }
        }
        self.entries.create(queue.id, &entry).await
    }
}

// ── CallNext ─────────────────────────────────────────────────────────────────

pub struct CallNextUseCase<Q: QueueRepository, E: EntryRepository> {
    pub queues: Q,
    pub entries: E,
}

impl<Q: QueueRepository, E: EntryRepository> CallNextUseCase<Q, E> {
    pub async fn execute(
        &self,
        queue_id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<QueueEntry, ServerError> {
        let scope = TenantScope::from(tenant_id);
        self.queues
            .find_scoped(scope, queue_id)
            .await?
            .ok_or(ServerError::QueueNotFound)?;
        let next = self
            .entries
            .find_next_waiting(scope, queue_id)
            .await?
            .ok_or(ServerError::EntryNotFound)?;
        if !self
            .entries
            .set_status(scope, next.id, EntryStatus::Called)
            .await?
        {
            return Err(ServerError::EntryNotFound);
        }
        self.entries
            .find_scoped(scope, next.id)
            .await?
            .ok_or(ServerError::EntryNotFound)
    }
}

// ── UpdateEntryStatus ────────────────────────────────────────────────────────

pub struct UpdateEntryStatusUseCase<E: EntryRepository> {
    pub entries: E,
}

impl<E: EntryRepository> UpdateEntryStatusUseCase<E> {
    pub async fn execute(
        &self,
        entry_id: Uuid,
        status: EntryStatus,
        tenant_id: Option<Uuid>,
    ) -> Result<QueueEntry, ServerError> {
        // Handlers only accept terminal targets; `called` goes through the
        // call-next path so positions stay coherent.
        if !status.is_terminal() {
            return Err(ServerError::InvalidEntryStatus);
        }
        let scope = TenantScope::from(tenant_id);
        let entry = self
            .entries
            .find_scoped(scope, entry_id)
            .await?
            .ok_or(ServerError::EntryNotFound)?;
        if entry.status.is_terminal() {
            return Err(ServerError::InvalidEntryStatus);
        }
        if !self.entries.set_status(scope, entry_id, status).await? {
            return Err(ServerError::EntryNotFound);
        }
        self.entries
            .find_scoped(scope, entry_id)
            .await?
            .ok_or(ServerError::EntryNotFound)
    }
}

// ── ListEntries ──────────────────────────────────────────────────────────────

pub struct ListEntriesUseCase<Q: QueueRepository, E: EntryRepository> {
    pub queues: Q,
    pub entries: E,
}

impl<Q: QueueRepository, E: EntryRepository> ListEntriesUseCase<Q, E> {
    pub async fn execute(
        &self,
        queue_id: Uuid,
        page: PageRequest,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<QueueEntry>, ServerError> {
        let scope = TenantScope::from(tenant_id);
        self.queues
            .find_scoped(scope, queue_id)
            .await?
            .ok_or(ServerError::QueueNotFound)?;
        self.entries.list_scoped(scope, queue_id, page).await
    }
}
