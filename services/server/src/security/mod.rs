//! Tenant isolation: security event log, tenant resolver, principal
//! validator, and the per-request middleware tying them together.

pub mod log;
pub mod middleware;
pub mod resolver;
pub mod validator;
