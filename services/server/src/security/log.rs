//! Security event log: tracing stream plus a durable sink.

#![allow(async_fn_in_trait)]

use lineup_domain::event::{SecurityEvent, SecurityLevel};
use serde_json::Value;

// Event names. CRITICAL/ERROR events reach the audit table; INFO/WARNING
// stay on the log stream.
pub const CROSS_TENANT_HEADER_ATTEMPT: &str = "CROSS_TENANT_HEADER_ATTEMPT";
pub const TENANT_RESOLVED: &str = "TENANT_RESOLVED";
pub const TENANT_NOT_FOUND: &str = "TENANT_NOT_FOUND";
pub const TENANT_INACTIVE: &str = "TENANT_INACTIVE";
pub const VALID_TENANT_ACCESS: &str = "VALID_TENANT_ACCESS";
pub const VALID_MERCHANT_ACCESS: &str = "VALID_MERCHANT_ACCESS";
pub const LEGACY_MERCHANT_ACCESS: &str = "LEGACY_MERCHANT_ACCESS";
pub const CROSS_TENANT_ACCESS_ATTEMPT: &str = "CROSS_TENANT_ACCESS_ATTEMPT";
pub const CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT: &str = "CROSS_TENANT_MERCHANT_ACCESS_ATTEMPT";
pub const MISSING_USER_OR_TENANT_CONTEXT: &str = "MISSING_USER_OR_TENANT_CONTEXT";
pub const TENANT_SCOPED_QUERY: &str = "TENANT_SCOPED_QUERY";
pub const NO_TENANT_CONTEXT: &str = "NO_TENANT_CONTEXT";
pub const MERCHANT_TENANT_TRANSFERRED: &str = "MERCHANT_TENANT_TRANSFERRED";
pub const TENANT_ISOLATION_ERROR: &str = "TENANT_ISOLATION_ERROR";

/// Where security events land after the log stream.
///
/// The production sink persists `Error`/`Critical` events to the audit
/// table and drops the rest; tests capture everything.
pub trait SecurityEventSink: Send + Sync {
    async fn record(&self, event: &SecurityEvent) -> anyhow::Result<()>;
}

/// Append-only security log.
///
/// Every event is written to the tracing stream first, then handed to the
/// sink. A sink failure is itself logged and swallowed: an audit-write
/// outage must not take tenant resolution down with it, and the stream
/// record has already been made.
#[derive(Debug, Clone)]
pub struct SecurityLog<S> {
    sink: S,
}

impl<S: SecurityEventSink> SecurityLog<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub async fn emit(&self, event: SecurityEvent) {
        match event.level {
            SecurityLevel::Info => {
                tracing::info!(event = event.name, details = %event.details, "security event");
            }
            SecurityLevel::Warning => {
                tracing::warn!(event = event.name, details = %event.details, "security event");
            }
            SecurityLevel::Error | SecurityLevel::Critical => {
                tracing::error!(
                    event = event.name,
                    level = event.level.as_str(),
                    details = %event.details,
                    "security event"
                );
            }
        }
        if let Err(e) = self.sink.record(&event).await {
            tracing::error!(error = %e, event = event.name, "failed to persist security event");
        }
    }

    pub async fn info(&self, name: &'static str, details: Value) {
        self.emit(SecurityEvent::new(SecurityLevel::Info, name, details))
            .await;
    }

    pub async fn warning(&self, name: &'static str, details: Value) {
        self.emit(SecurityEvent::new(SecurityLevel::Warning, name, details))
            .await;
    }

    pub async fn critical(&self, name: &'static str, details: Value) {
        self.emit(SecurityEvent::new(SecurityLevel::Critical, name, details))
            .await;
    }
}
