//! Shared types for the usage dashboard: the event model, error type,
//! timestamp parsing, request normalisation and CLI settings.

pub mod error;
pub mod models;
pub mod query;
pub mod settings;
pub mod timestamps;

pub use error::{DashboardError, Result};
