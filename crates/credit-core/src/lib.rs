//! Shared building blocks for the credit penetration pipeline.
//!
//! Holds the error taxonomy, the domain records and penetration results, the
//! declared input schemas, the typed table model handed to sinks, value
//! coercion helpers, statistics, and run settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod schema;
pub mod settings;
pub mod sinks;
pub mod sources;
pub mod stats;
pub mod table;

pub use error::{PipelineError, Result};
