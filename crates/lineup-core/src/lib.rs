//! Shared service infrastructure: health endpoints, request-id middleware,
//! tracing initialization, and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
