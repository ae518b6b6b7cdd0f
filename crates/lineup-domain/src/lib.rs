//! Domain types shared across all Lineup services.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod event;
pub mod pagination;
pub mod tenant;
