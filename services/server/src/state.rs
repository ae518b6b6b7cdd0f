use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::ServerConfig;
use crate::infra::db::{
    DbAuditSink, DbChatSessionRepository, DbEntryRepository, DbMembershipRepository,
    DbMerchantRepository, DbQueueRepository, DbTenantRepository,
};
use crate::security::log::SecurityLog;
use crate::security::middleware::IsolationService;
use crate::security::resolver::TenantResolver;
use crate::security::validator::TenantValidator;

/// Shared application state passed to every handler via axum `State`.
///
/// Repositories and the isolation service are constructed fresh per call;
/// only the connection pool and config are shared.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn security_log(&self) -> SecurityLog<DbAuditSink> {
        SecurityLog::new(DbAuditSink {
            db: self.db.clone(),
        })
    }

    pub fn isolation(
        &self,
    ) -> IsolationService<DbTenantRepository, DbMembershipRepository, DbAuditSink> {
        IsolationService {
            resolver: TenantResolver {
                tenants: self.tenant_repo(),
                log: self.security_log(),
            },
            validator: TenantValidator {
                memberships: self.membership_repo(),
                log: self.security_log(),
            },
            log: self.security_log(),
        }
    }

    pub fn tenant_repo(&self) -> DbTenantRepository {
        DbTenantRepository {
            db: self.db.clone(),
        }
    }

    pub fn membership_repo(&self) -> DbMembershipRepository {
        DbMembershipRepository {
            db: self.db.clone(),
        }
    }

    pub fn merchant_repo(&self) -> DbMerchantRepository {
        DbMerchantRepository {
            db: self.db.clone(),
            log: self.security_log(),
        }
    }

    pub fn queue_repo(&self) -> DbQueueRepository {
        DbQueueRepository {
            db: self.db.clone(),
            log: self.security_log(),
        }
    }

    pub fn entry_repo(&self) -> DbEntryRepository {
        DbEntryRepository {
            db: self.db.clone(),
            log: self.security_log(),
        }
    }

    pub fn chat_repo(&self) -> DbChatSessionRepository {
        DbChatSessionRepository {
            db: self.db.clone(),
            log: self.security_log(),
        }
    }
}
