use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use lineup_domain::event::SecurityEvent;
use lineup_domain::pagination::PageRequest;
use lineup_domain::tenant::{Tenant, TenantMembership, TenantScope};

use lineup_server::domain::repository::{
    MembershipRepository, MerchantRepository, TenantRepository,
};
use lineup_server::domain::types::{Merchant, MerchantUpdate, NewMerchant};
use lineup_server::error::ServerError;
use lineup_server::security::log::{SecurityEventSink, SecurityLog};

// ── CapturingSink ────────────────────────────────────────────────────────────

/// Test sink that records every event regardless of level.
#[derive(Clone, Default)]
pub struct CapturingSink {
    pub events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl CapturingSink {
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|e| e.name).collect()
    }
}

impl SecurityEventSink for CapturingSink {
    async fn record(&self, event: &SecurityEvent) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

pub fn capturing_log() -> (SecurityLog<CapturingSink>, CapturingSink) {
    let sink = CapturingSink::default();
    (SecurityLog::new(sink.clone()), sink)
}

// ── MockTenantRepo ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockTenantRepo {
    pub tenants: Vec<Tenant>,
}

impl MockTenantRepo {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self { tenants }
    }

    pub fn empty() -> Self {
        Self { tenants: vec![] }
    }
}

impl TenantRepository for MockTenantRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, ServerError> {
        Ok(self.tenants.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tenant>, ServerError> {
        Ok(self.tenants.iter().find(|t| t.slug == slug).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> Result<Option<Tenant>, ServerError> {
        Ok(self
            .tenants
            .iter()
            .find(|t| t.domain.as_deref() == Some(domain))
            .cloned())
    }

    async fn find_oldest_active(&self) -> Result<Option<Tenant>, ServerError> {
        Ok(self
            .tenants
            .iter()
            .filter(|t| t.is_active)
            .min_by_key(|t| t.created_at)
            .cloned())
    }
}

// ── MockMembershipRepo ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockMembershipRepo {
    pub memberships: Vec<TenantMembership>,
}

impl MockMembershipRepo {
    pub fn new(memberships: Vec<TenantMembership>) -> Self {
        Self { memberships }
    }

    pub fn empty() -> Self {
        Self {
            memberships: vec![],
        }
    }
}

impl MembershipRepository for MockMembershipRepo {
    async fn find_active(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<TenantMembership>, ServerError> {
        Ok(self
            .memberships
            .iter()
            .find(|m| m.user_id == user_id && m.tenant_id == tenant_id && m.is_active)
            .cloned())
    }
}

// ── MockMerchantRepo ─────────────────────────────────────────────────────────

/// In-memory merchant store honoring scope semantics: scoped reads see own
/// plus legacy rows, scoped writes tag rows with the scope tenant.
#[derive(Clone, Default)]
pub struct MockMerchantRepo {
    pub merchants: Arc<Mutex<Vec<Merchant>>>,
}

impl MockMerchantRepo {
    pub fn new(merchants: Vec<Merchant>) -> Self {
        Self {
            merchants: Arc::new(Mutex::new(merchants)),
        }
    }

    fn visible(scope: TenantScope, merchant: &Merchant) -> bool {
        match scope.tenant_id() {
            Some(t) => merchant.tenant_id.is_none() || merchant.tenant_id == Some(t),
            None => true,
        }
    }
}

impl MerchantRepository for MockMerchantRepo {
    async fn find_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
    ) -> Result<Option<Merchant>, ServerError> {
        Ok(self
            .merchants
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id && Self::visible(scope, m))
            .cloned())
    }

    async fn list_scoped(
        &self,
        scope: TenantScope,
        page: PageRequest,
    ) -> Result<Vec<Merchant>, ServerError> {
        let page = page.clamped();
        Ok(self
            .merchants
            .lock()
            .unwrap()
            .iter()
            .filter(|m| Self::visible(scope, m))
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_tagged(
        &self,
        scope: TenantScope,
        merchant: &NewMerchant,
    ) -> Result<Merchant, ServerError> {
        let now = Utc::now();
        let created = Merchant {
            id: Uuid::new_v4(),
            email: merchant.email.clone(),
            business_name: merchant.business_name.clone(),
            tenant_id: scope.tenant_id(),
            is_active: true,
            phone: merchant.phone.clone(),
            created_at: now,
            updated_at: now,
        };
        self.merchants.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_scoped(
        &self,
        scope: TenantScope,
        id: Uuid,
        changes: &MerchantUpdate,
    ) -> Result<bool, ServerError> {
        let mut merchants = self.merchants.lock().unwrap();
        match merchants
            .iter_mut()
            .find(|m| m.id == id && Self::visible(scope, m))
        {
            Some(m) => {
                if let Some(name) = &changes.business_name {
                    m.business_name = name.clone();
                }
                if let Some(phone) = &changes.phone {
                    m.phone = Some(phone.clone());
                }
                if let Some(active) = changes.is_active {
                    m.is_active = active;
                }
                m.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
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
        let mut merchants = self.merchants.lock().unwrap();
        match merchants.iter_mut().find(|m| m.id == id) {
            Some(m) => {
                m.tenant_id = Some(tenant_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_tenant(slug: &str) -> Tenant {
    Tenant {
        id: Uuid::new_v4(),
        name: slug.to_owned(),
        slug: slug.to_owned(),
        domain: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

pub fn test_membership(user_id: Uuid, tenant_id: Uuid) -> TenantMembership {
    TenantMembership {
        user_id,
        tenant_id,
        role: "staff".to_owned(),
        is_active: true,
    }
}

pub fn test_merchant(tenant_id: Option<Uuid>) -> Merchant {
    Merchant {
        id: Uuid::new_v4(),
        email: "owner@cafe.example".to_owned(),
        business_name: "Cafe Nord".to_owned(),
        tenant_id,
        is_active: true,
        phone: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
