//! Collaborators that consume the pipeline's outputs.
//!
//! The analyzers never touch the filesystem or a database; the runtime hands
//! their results to a [`ReportSink`] and a [`PersistenceSink`] instead.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{DistributorPenetration, MunicipalityPenetration};
use crate::table::Table;

/// Named output tables, ordered by name.
pub type TableSet = BTreeMap<String, Table>;

/// Persisted table names.
pub mod table_names {
    pub const POTENTIAL: &str = "potential";
    pub const SALES: &str = "sales";
    pub const SUMMARY: &str = "municipality_summary";
    pub const DISTRIBUTOR_PENETRATION: &str = "distributor_penetration";
    pub const MUNICIPALITY_PENETRATION: &str = "municipality_penetration";
}

/// Renders charts from the two analysis outputs.
pub trait ReportSink: Send + Sync {
    fn render(
        &self,
        distributor: &[DistributorPenetration],
        municipality: &[MunicipalityPenetration],
    ) -> Result<()>;
}

/// Writes a set of tables to a relational store.
///
/// Implementations must replace every named table or none of them.
pub trait PersistenceSink: Send + Sync {
    fn persist(&self, tables: &TableSet) -> Result<()>;
}
