//! Service layer for the usage dashboard.
//!
//! Owns the shared event snapshot and exposes the summary, search, export and
//! health operations consumed by front ends.

pub mod service;

pub use usage_core as core;
pub use usage_data as data;
