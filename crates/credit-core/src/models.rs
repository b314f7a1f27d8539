use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::{Cell, Column, Table, ToTable};

/// A prospective customer from the potential-customers source, after
/// cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PotentialRecord {
    /// Customer identifier.
    pub code: Option<String>,
    /// Distributor responsible for the customer.
    pub distributor: Option<String>,
    /// Upper-cased department name.
    pub department: Option<String>,
    /// Upper-cased municipality name.
    pub municipality: Option<String>,
    /// Approved credit limit, `None` when the source value was not numeric.
    pub credit_limit: Option<f64>,
    /// Socio-economic stratum, `None` when the source value was not numeric.
    pub stratum: Option<f64>,
    /// Source columns outside the schema, aligned with
    /// [`PotentialTable::extra_columns`].
    #[serde(default)]
    pub extra: Vec<Option<String>>,
}

/// A delivered sale from the sales-history source, after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// Parsed sale timestamp, `None` when the source value was not a date.
    pub sale_date: Option<NaiveDateTime>,
    /// Calendar year of `sale_date`.
    pub year: Option<i32>,
    /// Calendar month (1-12) of `sale_date`.
    pub month: Option<u32>,
    /// Channel that made the sale; joins to [`PotentialRecord::distributor`].
    pub distributor_channel: Option<String>,
    /// Upper-cased department name.
    pub department: Option<String>,
    /// Upper-cased municipality name.
    pub municipality: Option<String>,
    /// Document id of the customer who took the credit.
    pub customer_document_id: Option<String>,
    /// Total value of the sale.
    pub total_value: Option<f64>,
    /// Number of installments agreed.
    pub installments: Option<f64>,
    /// Status string as exported; always the delivered status after cleaning.
    pub sale_status: Option<String>,
    /// Source columns outside the schema, aligned with
    /// [`SalesTable::extra_columns`].
    #[serde(default)]
    pub extra: Vec<Option<String>>,
}

/// The cleaned potential-customers table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PotentialTable {
    /// Headers of source columns carried through untouched.
    pub extra_columns: Vec<String>,
    pub records: Vec<PotentialRecord>,
}

/// The cleaned, delivered-only sales table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SalesTable {
    /// Headers of source columns carried through untouched.
    pub extra_columns: Vec<String>,
    pub records: Vec<SaleRecord>,
}

// ── Penetration results ───────────────────────────────────────────────────────

/// Penetration metrics for one distributor.
///
/// Sales-side fields are `None` when the distributor had no delivered sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributorPenetration {
    pub distributor: String,
    pub potential_customer_count: u64,
    pub total_credit_limit: f64,
    pub customers_with_credit: Option<u64>,
    pub total_sales_value: Option<f64>,
    pub average_ticket: Option<f64>,
    pub penetration_rate: Option<f64>,
}

/// Geography key of a [`MunicipalityPenetration`] row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MunicipalityKey {
    pub distributor: String,
    pub department: String,
    pub municipality: String,
}

/// Penetration metrics for one distributor within one municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityPenetration {
    pub distributor: String,
    pub department: String,
    pub municipality: String,
    pub potential_customer_count: u64,
    pub total_credit_limit: f64,
    pub customers_with_credit: Option<u64>,
    pub total_sales_value: Option<f64>,
    pub average_ticket: Option<f64>,
    pub average_installments: Option<f64>,
    pub penetration_rate: Option<f64>,
}

/// `customers_with_credit / potential_customer_count * 100`.
///
/// Returns `None` when the sales side is missing or the denominator is zero.
pub fn penetration_rate(customers_with_credit: Option<u64>, potential_count: u64) -> Option<f64> {
    let customers = customers_with_credit?;
    if potential_count == 0 {
        return None;
    }
    Some(customers as f64 / potential_count as f64 * 100.0)
}

// ── Table conversions ─────────────────────────────────────────────────────────

fn extra_cells(extra: &[Option<String>], width: usize) -> impl Iterator<Item = Cell> + '_ {
    (0..width).map(move |i| extra.get(i).map_or(Cell::Null, Cell::from))
}

impl ToTable for PotentialTable {
    fn to_table(&self) -> Table {
        let mut columns = vec![
            Column::text("code"),
            Column::text("distributor"),
            Column::text("department"),
            Column::text("municipality"),
            Column::real("credit_limit"),
            Column::real("stratum"),
        ];
        columns.extend(self.extra_columns.iter().map(Column::text));

        let mut table = Table::new(columns);
        for r in &self.records {
            let mut row = vec![
                Cell::from(&r.code),
                Cell::from(&r.distributor),
                Cell::from(&r.department),
                Cell::from(&r.municipality),
                Cell::from(r.credit_limit),
                Cell::from(r.stratum),
            ];
            row.extend(extra_cells(&r.extra, self.extra_columns.len()));
            table.push_row(row);
        }
        table
    }
}

impl ToTable for SalesTable {
    fn to_table(&self) -> Table {
        let mut columns = vec![
            Column::text("sale_date"),
            Column::integer("year"),
            Column::integer("month"),
            Column::text("distributor_channel"),
            Column::text("department"),
            Column::text("municipality"),
            Column::text("customer_document_id"),
            Column::real("total_value"),
            Column::real("installments"),
            Column::text("sale_status"),
        ];
        columns.extend(self.extra_columns.iter().map(Column::text));

        let mut table = Table::new(columns);
        for r in &self.records {
            let mut row = vec![
                Cell::from(r.sale_date),
                Cell::from(r.year.map(i64::from)),
                Cell::from(r.month.map(i64::from)),
                Cell::from(&r.distributor_channel),
                Cell::from(&r.department),
                Cell::from(&r.municipality),
                Cell::from(&r.customer_document_id),
                Cell::from(r.total_value),
                Cell::from(r.installments),
                Cell::from(&r.sale_status),
            ];
            row.extend(extra_cells(&r.extra, self.extra_columns.len()));
            table.push_row(row);
        }
        table
    }
}

impl ToTable for [DistributorPenetration] {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            Column::text("distributor"),
            Column::integer("potential_customer_count"),
            Column::real("total_credit_limit"),
            Column::integer("customers_with_credit"),
            Column::real("total_sales_value"),
            Column::real("average_ticket"),
            Column::real("penetration_rate"),
        ]);
        for r in self {
            table.push_row(vec![
                Cell::from(r.distributor.as_str()),
                Cell::from(r.potential_customer_count),
                Cell::from(r.total_credit_limit),
                Cell::from(r.customers_with_credit),
                Cell::from(r.total_sales_value),
                Cell::from(r.average_ticket),
                Cell::from(r.penetration_rate),
            ]);
        }
        table
    }
}

impl ToTable for [MunicipalityPenetration] {
    fn to_table(&self) -> Table {
        let mut table = Table::new(vec![
            Column::text("distributor"),
            Column::text("department"),
            Column::text("municipality"),
            Column::integer("potential_customer_count"),
            Column::real("total_credit_limit"),
            Column::integer("customers_with_credit"),
            Column::real("total_sales_value"),
            Column::real("average_ticket"),
            Column::real("average_installments"),
            Column::real("penetration_rate"),
        ]);
        for r in self {
            table.push_row(vec![
                Cell::from(r.distributor.as_str()),
                Cell::from(r.department.as_str()),
                Cell::from(r.municipality.as_str()),
                Cell::from(r.potential_customer_count),
                Cell::from(r.total_credit_limit),
                Cell::from(r.customers_with_credit),
                Cell::from(r.total_sales_value),
                Cell::from(r.average_ticket),
                Cell::from(r.average_installments),
                Cell::from(r.penetration_rate),
            ]);
        }
        table
    }
}
