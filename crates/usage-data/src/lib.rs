//! Data layer for the usage dashboard.
//!
//! Reads the source CSV exports into an immutable [`store::EventStore`], then
//! answers filter, aggregation and export queries over it.

pub mod aggregator;
pub mod demo;
pub mod export;
pub mod filter;
pub mod reader;
pub mod store;

pub use usage_core as core;
