//! Declared input schemas for the cleaning stages.
//!
//! Every stage that consumes a [`RawTable`] resolves its [`TableSchema`]
//! first, so a missing column fails fast with [`PipelineError::Schema`]
//! instead of surfacing deep inside an aggregation.

use crate::error::{PipelineError, Result};
use crate::table::RawTable;

// ── ColumnSpec ────────────────────────────────────────────────────────────────

/// A required logical column and the header names that satisfy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Canonical column name, also used for persisted output.
    pub name: &'static str,
    /// Alternative headers used by the production exports.
    pub aliases: &'static [&'static str],
}

impl ColumnSpec {
    pub const fn new(name: &'static str, aliases: &'static [&'static str]) -> Self {
        Self { name, aliases }
    }

    /// Whether `header` names this column. Canonical name and aliases are
    /// matched exactly.
    pub fn matches(&self, header: &str) -> bool {
        header == self.name || self.aliases.iter().any(|alias| *alias == header)
    }
}

// ── TableSchema ───────────────────────────────────────────────────────────────

/// The set of columns a stage requires from its input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [ColumnSpec],
}

/// Column positions produced by [`TableSchema::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// Index into the raw headers for each schema column, in schema order.
    pub required: Vec<usize>,
    /// Indices of raw columns not claimed by the schema, in file order.
    pub extra: Vec<usize>,
}

impl ResolvedSchema {
    /// Raw column index of the `n`-th schema column.
    pub fn index(&self, n: usize) -> usize {
        self.required[n]
    }
}

impl TableSchema {
    /// Locate every required column in `raw`.
    ///
    /// Fails with [`PipelineError::Schema`] naming the first column (in
    /// schema order) that no header satisfies.
    pub fn resolve(&self, raw: &RawTable) -> Result<ResolvedSchema> {
        let mut required = Vec::with_capacity(self.columns.len());
        for spec in self.columns {
            let idx = raw
                .headers
                .iter()
                .position(|h| spec.matches(h))
                .ok_or_else(|| PipelineError::schema(self.table, spec.name))?;
            required.push(idx);
        }

        let extra = (0..raw.headers.len())
            .filter(|i| !required.contains(i))
            .collect();

        Ok(ResolvedSchema { required, extra })
    }
}

// ── Pipeline schemas ──────────────────────────────────────────────────────────

/// Column order of [`POTENTIAL_SCHEMA`].
pub mod potential {
    pub const CODE: usize = 0;
    pub const DISTRIBUTOR: usize = 1;
    pub const DEPARTMENT: usize = 2;
    pub const MUNICIPALITY: usize = 3;
    pub const CREDIT_LIMIT: usize = 4;
    pub const STRATUM: usize = 5;
}

/// Column order of [`SALES_SCHEMA`].
pub mod sales {
    pub const SALE_DATE: usize = 0;
    pub const DISTRIBUTOR_CHANNEL: usize = 1;
    pub const DEPARTMENT: usize = 2;
    pub const MUNICIPALITY: usize = 3;
    pub const CUSTOMER_DOCUMENT_ID: usize = 4;
    pub const TOTAL_VALUE: usize = 5;
    pub const INSTALLMENTS: usize = 6;
    pub const SALE_STATUS: usize = 7;
}

pub const POTENTIAL_SCHEMA: TableSchema = TableSchema {
    table: "potential",
    columns: &[
        ColumnSpec::new("code", &["Codigo"]),
        ColumnSpec::new("distributor", &["Distribuidora"]),
        ColumnSpec::new("department", &["nombreDepartamento"]),
        ColumnSpec::new("municipality", &["municipio"]),
        ColumnSpec::new("credit_limit", &["Cupo"]),
        ColumnSpec::new("stratum", &["estrato"]),
    ],
};

pub const SALES_SCHEMA: TableSchema = TableSchema {
    table: "sales",
    columns: &[
        ColumnSpec::new("sale_date", &["fechaVenta"]),
        ColumnSpec::new("distributor_channel", &["Canal"]),
        ColumnSpec::new("department", &["nombreDepartamento"]),
        ColumnSpec::new("municipality", &["municipio"]),
        ColumnSpec::new("customer_document_id", &["documentoUsuario"]),
        ColumnSpec::new("total_value", &["valorTotal"]),
        ColumnSpec::new("installments", &["cuotas"]),
        ColumnSpec::new("sale_status", &["estadoVenta"]),
    ],
};

// ── Tests ─────────────────────────────────────────────────────────────────────
