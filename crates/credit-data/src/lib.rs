//! Data layer for the credit penetration pipeline.
//!
//! Loads the delimited sources, normalises them into typed tables, computes
//! the distributor and municipality penetration results, ranks them for the
//! report, and persists table snapshots to SQLite.

pub mod aggregator;
pub mod analysis;
pub mod cleaner;
pub mod ranking;
pub mod reader;
pub mod store;

pub use credit_core as core;
