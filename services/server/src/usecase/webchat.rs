//! Web-chat session operations. Sessions hang off queues, so scoping works
//! the same way queue entries do.

use uuid::Uuid;

use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::TenantScope;

use crate::domain::repository::{ChatSessionRepository, QueueRepository};
use crate::domain::types::{ChatSession, ChatStatus, NewChatSession};
use crate::error::ServerError;

// ── StartChatSession ─────────────────────────────────────────────────────────

pub struct StartChatSessionInput {
    pub queue_id: Uuid,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
}

pub struct StartChatSessionUseCase<Q: QueueRepository, C: ChatSessionRepository> {
    pub queues: Q,
    pub chats: C,
}

impl<Q: QueueRepository, C: ChatSessionRepository> StartChatSessionUseCase<Q, C> {
    pub async fn execute(
        &self,
        input: StartChatSessionInput,
        tenant_id: Option<Uuid>,
    ) -> Result<ChatSession, ServerError> {
        if input.visitor_name.trim().is_empty() {
            return Err(ServerError::MissingData);
        }
        let queue = self
            .queues
            .find_scoped(TenantScope::from(tenant_id), input.queue_id)
            .await?
            .ok_or(ServerError::QueueNotFound)?;
        if !queue.is_active {
            return Err(ServerError::QueueClosed);
        }
        self.chats
            .create(&NewChatSession {
                queue_id: queue.id,
                visitor_name: input.visitor_name,
                visitor_phone: input.visitor_phone,
            })
            .await
    }
}

// ── GetChatSession ───────────────────────────────────────────────────────────

pub struct GetChatSessionUseCase<C: ChatSessionRepository> {
    pub chats: C,
}

impl<C: ChatSessionRepository> GetChatSessionUseCase<C> {
    pub async fn execute(
        &self,
        id: Uuid,
        tenant_id: Option<Uuid>,
    ) -> Result<ChatSession, ServerError> {
        self.chats
            .find_scoped(TenantScope::from(tenant_id), id)
            .await?
            .ok_or(ServerError::ChatSessionNotFound)
    }
}

// ── ListChatSessions ─────────────────────────────────────────────────────────

pub struct ListChatSessionsUseCase<Q: QueueRepository, C: ChatSessionRepository> {
    pub queues: Q,
    pub chats: C,
}

impl<Q: QueueRepository, C: ChatSessionRepository> ListChatSessionsUseCase<Q, C> {
    pub async fn execute(
        &self,
        queue_id: Uuid,
        page: PageRequest,
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<ChatSession>, ServerError> {
        let scope = TenantScope::from(tenant_id);
        self.queues
            .find_scoped(scope, queue_id)
            .await?
            .ok_or(ServerError::QueueNotFound)?;
        self.chats.list_scoped(scope, queue_id, page).await
    }
}

// ── CloseChatSession ─────────────────────────────────────────────────────────

pub struct CloseChatSessionUseCase<C: ChatSessionRepository> {
    pub chats: C,
}

impl<C: ChatSessionRepository> CloseChatSessionUseCase<C> {
    /// Closing an already-closed session is a no-op, not an error.
    pub async fn execute(&self, id: Uuid, tenant_id: Option<Uuid>) -> Result<(), ServerError> {
        let scope = TenantScope::from(tenant_id);
        let session = self
            .chats
            .find_scoped(scope, id)
            .await?
            .ok_or(ServerError::ChatSessionNotFound)?;
        if session.status == ChatStatus::Closed {
            return Ok(());
        }
        if !self.chats.close_scoped(scope, id).await? {
            return Err(ServerError::ChatSessionNotFound);
        }
        Ok(())
    }
}
