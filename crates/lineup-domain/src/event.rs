//! Security event types consumed by the audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Severity of a security event.
///
/// Ordering matters: `Error` and above are durably persisted to the audit
/// table, `Warning` and below only reach the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityLevel {
    Info,
    Warning,
    Error,
    Critical,
}

impl SecurityLevel {
    /// Whether events at this level must be written to the durable audit store.
    pub fn is_persisted(self) -> bool {
        self >= Self::Error
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// A single append-only security event. Created and immediately written;
/// never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub level: SecurityLevel,
    pub name: &'static str,
    pub details: Value,
    pub timestamp: DateTime<Utc>,
    /// Principal ids, when known, for the persisted audit row.
    pub user_id: Option<Uuid>,
    pub merchant_id: Option<Uuid>,
}

impl SecurityEvent {
    pub fn new(level: SecurityLevel, name: &'static str, details: Value) -> Self {
        Self {
            level,
            name,
            details,
            timestamp: Utc::now(),
            user_id: None,
            merchant_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_merchant(mut self, merchant_id: Uuid) -> Self {
        self.merchant_id = Some(merchant_id);
        self
    }
}
