//! sea-orm implementations of the repository traits.
//!
//! Tenant scoping happens here and nowhere else: the scope-condition
//! builders below are the single place the `tenant_id = ? OR tenant_id IS
//! NULL` rule is written down. Entities without a tenant column reach the
//! condition through inner joins down to the owning merchant, so a
//! cross-tenant read simply matches no rows.

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde_json::json;
use uuid::Uuid;

use lineup_domain::event::SecurityEvent;
use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::{Tenant, TenantMembership, TenantScope};
use lineup_server_schema::{
    audit_logs, chat_sessions, merchants, queue_entries, queues, tenant_users, tenants,
};

use crate::domain::repository::{
    ChatSessionRepository, EntryRepository, MembershipRepository, MerchantRepository,
    QueueRepository, TenantRepository,
};
use crate::domain::types::{
    ChatSession, ChatStatus, EntryStatus, Merchant, MerchantUpdate, NewChatSession, NewEntry,
    NewMerchant, NewQueue, Queue, QueueEntry, QueueUpdate,
};
use crate::error::ServerError;
use crate::security::log::{
    NO_TENANT_CONTEXT, SecurityEventSink, SecurityLog, TENANT_SCOPED_QUERY,
};

// ── Audit sink ───────────────────────────────────────────────────────────────

/// Durable sink for the security log. INFO/WARNING events stay on the
/// tracing stream; ERROR/CRITICAL get an audit row.
#[derive(Clone)]
pub struct DbAuditSink {
    pub db: DatabaseConnection,
}

impl SecurityEventSink for DbAuditSink {
    async fn record(&self, event: &SecurityEvent) -> anyhow::Result<()> {
        if !event.level.is_persisted() {
            return Ok(());
        }
        audit_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            action: Set(event.name.to_owned()),
            resource_type: Set("tenant_security".to_owned()),
            details: Set(event.details.clone()),
            timestamp: Set(event.timestamp),
            user_id: Set(event.user_id),
            merchant_id: Set(event.merchant_id),
        }
        .insert(&self.db)
        .await
        .context("append audit log row")?;
        Ok(())
    }
}

// ── Scope conditions ─────────────────────────────────────────────────────────

/// The merchant-level tenant condition: rows of the given tenant plus
/// legacy rows with no tenant at all. `None` for an unscoped handle.
fn merchant_tenant_condition(scope: TenantScope) -> Option<Condition> {
    scope.tenant_id().map(|id| {
        Condition::any()
            .add(merchants::Column::TenantId.eq(id))
            .add(merchants::Column::TenantId.is_null())
    })
}

fn scoped_merchants(scope: TenantScope) -> Select<merchants::Entity> {
    let mut select = merchants::Entity::find();
    if let Some(condition) = merchant_tenant_condition(scope) {
        select = select.filter(condition);
    }
    select
}

fn scoped_queues(scope: TenantScope) -> Select<queues::Entity> {
    let mut select = queues::Entity::find();
    if let Some(condition) = merchant_tenant_condition(scope) {
        select = select
            .join(JoinType::InnerJoin, queues::Relation::Merchants.def())
            .filter(condition);
    }
    select
}

fn scoped_entries(scope: TenantScope) -> Select<queue_entries::Entity> {
    let mut select = queue_entries::Entity::find();
    if let Some(condition) = merchant_tenant_condition(scope) {
        select = select
            .join(JoinType::InnerJoin, queue_entries::Relation::Queues.def())
            .join(JoinType::InnerJoin, queues::Relation::Merchants.def())
            .filter(condition);
    }
    select
}

fn scoped_chat_sessions(scope: TenantScope) -> Select<chat_sessions::Entity> {
    let mut select = chat_sessions::Entity::find();
    if let Some(condition) = merchant_tenant_condition(scope) {
        select = select
            .join(JoinType::InnerJoin, chat_sessions::Relation::Queues.def())
            .join(JoinType::InnerJoin, queues::Relation::Merchants.def())
            .filter(condition);
    }
    select
}

/// One event per data access: INFO when scoped, WARNING for the explicit
/// unscoped escape hatch.
async fn log_access<S: SecurityEventSink>(
    log: &SecurityLog<S>,
    scope: TenantScope,
    entity: &'static str,
    operation: &'static str,
) {
    match scope.tenant_id() {
        Some(tenant_id) => {
            log.info(
                TENANT_SCOPED_QUERY,
                json!({"entity": entity, "operation": operation, "tenant_id": tenant_id}),
            )
            .await;
        }
        None => {
            log.warning(
                NO_TENANT_CONTEXT,
                json!({"entity": entity, "operation": operation}),
            )
            .await;
        }
    }
}

// ── Tenant repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTenantRepository {
    pub db: DatabaseConnection,
}

impl TenantRepository for DbTenantRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, ServerError> {
        let model = tenants::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tenant by id")?;
        Ok(model.map(tenant_from_model))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, ServerError> {
        let model = tenants::Entity::find()
            .filter(tenants::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .context("find tenant by slug")?;
        Ok(model.map(tenant_from_model))
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, ServerError> {
        let model = tenants::Entity::find()
            .filter(tenants::Column::Domain.eq(domain))
            .one(&self.db)
            .await
            .context("find tenant by domain")?;
        Ok(model.map(tenant_from_model))
    }

    async fn find_oldest_active(&self) -> Result<Option<Tenant>, ServerError> {
        let model = tenants::Entity::find()
            .filter(tenants::Column::IsActive.eq(true))
            .order_by_asc(tenants::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find oldest active tenant")?;
        Ok(model.map(tenant_from_model))
    }
}

fn tenant_from_model(model: tenants::Model) -> Tenant {
    Tenant {
        id: model.id,
        name: model.name,
        slug: model.slug,
        domain: model.domain,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

// ── Membership repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMembershipRepository {
    pub db: DatabaseConnection,
}

impl MembershipRepository for DbMembershipRepository {
    async fn find_active(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<TenantMembership>, ServerError> {
        let model = tenant_users::Entity::find()
            .filter(tenant_users::Column::UserId.eq(user_id))
            .filter(tenant_users::Column::TenantId.eq(tenant_id))
            .filter(tenant_users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find active tenant membership")?;
        Ok(model.map(|m| TenantMembership {
            user_id: m.user_id,
            tenant_id: m.tenant_id,
            role: m.role,
            is_active: m.is_active,
        }))
    }
}

// ── Merchant repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMerchantRepository {
    pub db: DatabaseConnection,
    pub log: SecurityLog<DbAuditSink>,
}

impl MerchantRepository for DbMerchantRepository {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Merchant>, ServerError> {
        log_access(&self.log, scope, "merchant", "find").await;
        let model = scoped_merchants(scope)
            .filter(merchants::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find merchant")?;
        Ok(model.map(merchant_from_model))
    }

    async fn list_scoped(
        &self,
        scope: TenantScope,
        page: PageRequest,
    ) -> Result<Vec<Merchant>, ServerError> {
        log_access(&self.log, scope, "merchant", "list").await;
        let page = page.clamped();
        let models = scoped_merchants(scope)
            .order_by_asc(merchants::Column::CreatedAt)
            .limit(page.per_page as u64)
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list merchants")?;
        Ok(models.into_iter().map(merchant_from_model).collect())
    }

    async fn create_tagged(
        &self,
        scope: TenantScope,
        merchant: &NewMerchant,
    ) -> Result<Merchant, ServerError> {
        log_access(&self.log, scope, "merchant", "create").await;
        let now = Utc::now();
        // The tenant tag comes from the scope, never from the caller.
        let model = merchants::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(merchant.email.clone()),
            business_name: Set(merchant.business_name.clone()),
            tenant_id: Set(scope.tenant_id()),
            is_active: Set(true),
            password_hash: Set(merchant.password_hash.clone()),
            phone: Set(merchant.phone.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create merchant")?;
        Ok(merchant_from_model(model))
    }

    async fn update_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
        changes: &MerchantUpdate,
    ) -> Result<bool, ServerError> {
        log_access(&self.log, scope, "merchant", "update").await;
        let mut am = merchants::ActiveModel {
            ..Default::default()
        };
        if let Some(name) = &changes.business_name {
            am.business_name = Set(name.clone());
        }
        if let Some(phone) = &changes.phone {
            am.phone = Set(Some(phone.clone()));
        }
        if let Some(active) = changes.is_active {
            am.is_active = Set(active);
        }
        am.updated_at = Set(Utc::now());

        let mut update = merchants::Entity::update_many()
            .set(am)
            .filter(merchants::Column::Id.eq(id));
        if let Some(condition) = merchant_tenant_condition(scope) {
            update = update.filter(condition);
        }
        let result = update.exec(&self.db).await.context("update merchant")?;
        Ok(result.rows_affected > 0)
    }

    async fn deactivate_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError> {
        self.update_scoped(
            scope,
            id,
            &MerchantUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    async fn transfer_tenant(&self, id: Uuid, tenant_id: Uuid) -> Result<bool, ServerError> {
        let result = merchants::Entity::update_many()
            .set(merchants::ActiveModel {
                tenant_id: Set(Some(tenant_id)),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(merchants::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("transfer merchant tenant")?;
        Ok(result.rows_affected > 0)
    }
}

fn merchant_from_model(model: merchants::Model) -> Merchant {
    Merchant {
        id: model.id,
        email: model.email,
        business_name: model.business_name,
        tenant_id: model.tenant_id,
        is_active: model.is_active,
        phone: model.phone,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Queue repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbQueueRepository {
    pub db: DatabaseConnection,
    pub log: SecurityLog<DbAuditSink>,
}

impl QueueRepository for DbQueueRepository {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Queue>, ServerError> {
        log_access(&self.log, scope, "queue", "find").await;
        let model = scoped_queues(scope)
            .filter(queues::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find queue")?;
        Ok(model.map(queue_from_model))
    }

    async fn list_scoped(
        &self,
        scope: TenantScope,
        merchant_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<Vec<Queue>, ServerError> {
        log_access(&self.log, scope, "queue", "list").await;
        let page = page.clamped();
        let mut select = scoped_queues(scope);
        if let Some(merchant_id) = merchant_id {
            select = select.filter(queues::Column::MerchantId.eq(merchant_id));
        }
        let models = select
            .order_by_asc(queues::Column::CreatedAt)
            .limit(page.per_page as u64)
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list queues")?;
        Ok(models.into_iter().map(queue_from_model).collect())
    }

    async fn create(&self, queue: &NewQueue) -> Result<Queue, ServerError> {
        let now = Utc::now();
        let model = queues::ActiveModel {
            id: Set(Uuid::new_v4()),
            merchant_id: Set(queue.merchant_id),
            name: Set(queue.name.clone()),
            description: Set(queue.description.clone()),
            is_active: Set(true),
            max_size: Set(queue.max_size),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .context("create queue")?;
        Ok(queue_from_model(model))
    }

    async fn update_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
        changes: &QueueUpdate,
    ) -> Result<bool, ServerError> {
        log_access(&self.log, scope, "queue", "update").await;
        // Scope visibility is a joined read; the write itself goes by pk.
        if self.find_scoped(scope, id).await?.is_none() {
            return Ok(false);
        }
        let mut am = queues::ActiveModel {
            id: Set(id),
            ..Default::default()
        };
        if let Some(name) = &changes.name {
            am.name = Set(name.clone());
        }
        if let Some(description) = &changes.description {
            am.description = Set(Some(description.clone()));
        }
        if let Some(active) = changes.is_active {
            am.is_active = Set(active);
        }
        if let Some(max_size) = changes.max_size {
            am.max_size = Set(Some(max_size));
        }
        am.updated_at = Set(Utc::now());
        am.update(&self.db).await.context("update queue")?;
        Ok(true)
    }

    async fn delete_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError> {
        log_access(&self.log, scope, "queue", "delete").await;
        if self.find_scoped(scope, id).await?.is_none() {
            return Ok(false);
        }
        queues::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete queue")?;
        Ok(true)
    }
}

fn queue_from_model(model: queues::Model) -> Queue {
    Queue {
        id: model.id,
        merchant_id: model.merchant_id,
        name: model.name,
        description: model.description,
        is_active: model.is_active,
        max_size: model.max_size,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Entry repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbEntryRepository {
    pub db: DatabaseConnection,
    pub log: SecurityLog<DbAuditSink>,
}

impl EntryRepository for DbEntryRepository {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<QueueEntry>, ServerError> {
        log_access(&self.log, scope, "queue_entry", "find").await;
        let model = scoped_entries(scope)
            .filter(queue_entries::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find queue entry")?;
        model.map(entry_from_model).transpose()
    }

    async fn list_scoped(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<QueueEntry>, ServerError> {
        log_access(&self.log, scope, "queue_entry", "list").await;
        let page = page.clamped();
        let models = scoped_entries(scope)
            .filter(queue_entries::Column::QueueId.eq(queue_id))
            .order_by_asc(queue_entries::Column::Position)
            .limit(page.per_page as u64)
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list queue entries")?;
        models.into_iter().map(entry_from_model).collect()
    }

    async fn count_waiting(&self, queue_id: Uuid) -> Result<u64, ServerError> {
        let count = queue_entries::Entity::find()
            .filter(queue_entries::Column::QueueId.eq(queue_id))
            .filter(queue_entries::Column::Status.eq(EntryStatus::Waiting.as_str()))
            .count(&self.db)
            .await
            .context("count waiting entries")?;
        Ok(count)
    }

    async fn create(&self, queue_id: Uuid, entry: &NewEntry) -> Result<QueueEntry, ServerError> {
        let last = queue_entries::Entity::find()
            .filter(queue_entries::Column::QueueId.eq(queue_id))
            .order_by_desc(queue_entries::Column::Position)
            .one(&self.db)
            .await
            .context("find last queue position")?;
        let position = last.map(|e| e.position + 1).unwrap_or(1);

        let model = queue_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            queue_id: Set(queue_id),
            customer_name: Set(entry.customer_name.clone()),
            customer_phone: Set(entry.customer_phone.clone()),
            position: Set(position),
            status: Set(EntryStatus::Waiting.as_str().to_owned()),
            created_at: Set(Utc::now()),
            called_at: Set(None),
            served_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("create queue entry")?;
        entry_from_model(model)
    }

    async fn find_next_waiting(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
    ) -> Result<Option<QueueEntry>, ServerError> {
        log_access(&self.log, scope, "queue_entry", "find_next_waiting").await;
        let model = scoped_entries(scope)
            .filter(queue_entries::Column::QueueId.eq(queue_id))
            .filter(queue_entries::Column::Status.eq(EntryStatus::Waiting.as_str()))
            .order_by_asc(queue_entries::Column::Position)
            .one(&self.db)
            .await
            .context("find next waiting entry")?;
        model.map(entry_from_model).transpose()
    }

    async fn set_status(
        &self,
        scope: TenantScope,
        id: Uuid,
        status: EntryStatus,
    ) -> Result<bool, ServerError> {
        log_access(&self.log, scope, "queue_entry", "set_status").await;
        if self.find_scoped(scope, id).await?.is_none() {
            return Ok(false);
        }
        let mut am = queue_entries::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            ..Default::default()
        };
        match status {
            EntryStatus::Called => am.called_at = Set(Some(Utc::now())),
            EntryStatus::Served => am.served_at = Set(Some(Utc::now())),
            EntryStatus::Waiting | EntryStatus::Cancelled => {}
        }
        am.update(&self.db).await.context("update entry status")?;
        Ok(true)
    }
}

fn entry_from_model(model: queue_entries::Model) -> Result<QueueEntry, ServerError> {
    let status = EntryStatus::from_str(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown entry status: {}", model.status))?;
    Ok(QueueEntry {
        id: model.id,
        queue_id: model.queue_id,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        position: model.position,
        status,
        created_at: model.created_at,
        called_at: model.called_at,
        served_at: model.served_at,
    })
}

// ── Chat session repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbChatSessionRepository {
    pub db: DatabaseConnection,
    pub log: SecurityLog<DbAuditSink>,
}

impl ChatSessionRepository for DbChatSessionRepository {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<ChatSession>, ServerError> {
        log_access(&self.log, scope, "chat_session", "find").await;
        let model = scoped_chat_sessions(scope)
            .filter(chat_sessions::Column::Id.eq(id))
            .one(&self.db)
            .await
            .context("find chat session")?;
        model.map(chat_session_from_model).transpose()
    }

    async fn list_scoped(
        &self,
        scope: TenantScope,
        queue_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<ChatSession>, ServerError> {
        log_access(&self.log, scope, "chat_session", "list").await;
        let page = page.clamped();
        let models = scoped_chat_sessions(scope)
            .filter(chat_sessions::Column::QueueId.eq(queue_id))
            .order_by_desc(chat_sessions::Column::CreatedAt)
            .limit(page.per_page as u64)
            .offset(page.offset())
            .all(&self.db)
            .await
            .context("list chat sessions")?;
        models.into_iter().map(chat_session_from_model).collect()
    }

    async fn create(&self, session: &NewChatSession) -> Result<ChatSession, ServerError> {
        let model = chat_sessions::ActiveModel {
            id: Set(Uuid::new_v4()),
            queue_id: Set(session.queue_id),
            visitor_name: Set(session.visitor_name.clone()),
            visitor_phone: Set(session.visitor_phone.clone()),
            status: Set(ChatStatus::Open.as_str().to_owned()),
            created_at: Set(Utc::now()),
            closed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .context("create chat session")?;
        chat_session_from_model(model)
    }

    async fn close_scoped(&self, scope: TenantScope, id: Uuid) -> Result<bool, ServerError> {
        log_access(&self.log, scope, "chat_session", "close").await;
        if self.find_scoped(scope, id).await?.is_none() {
            return Ok(false);
        }
        chat_sessions::ActiveModel {
            id: Set(id),
            status: Set(ChatStatus::Closed.as_str().to_owned()),
            closed_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("close chat session")?;
        Ok(true)
    }
}

fn chat_session_from_model(model: chat_sessions::Model) -> Result<ChatSession, ServerError> {
    let status = ChatStatus::from_str(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown chat status: {}", model.status))?;
    Ok(ChatSession {
        id: model.id,
        queue_id: model.queue_id,
        visitor_name: model.visitor_name,
        visitor_phone: model.visitor_phone,
        status,
        created_at: model.created_at,
        closed_at: model.closed_at,
    })
}
