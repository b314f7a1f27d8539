//! Runtime orchestration layer for the credit penetration pipeline.
//!
//! Drives the load, clean, analyze and sink stages as concurrent tasks on
//! tokio's blocking pool and reports a [`orchestrator::RunSummary`].

pub mod orchestrator;

pub use credit_core as core;
pub use credit_data as data;
pub use orchestrator::{PipelineRunner, RunSummary};
