//! sea-orm entities for the Lineup server.
//!
//! `queues`, `queue_entries`, and `chat_sessions` have no tenant column:
//! their tenant affiliation is only reachable through the owning merchant.

pub mod audit_logs;
pub mod chat_sessions;
pub mod merchants;
pub mod queue_entries;
pub mod queues;
pub mod tenant_users;
pub mod tenants;
