//! Principal types established by the upstream auth layer.

pub mod principal;
