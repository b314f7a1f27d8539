//! Penetration analysis.
//!
//! Joins potential-side aggregates with sales-side aggregates, rooted at the
//! potential side: every distributor (or distributor/municipality) with
//! potential customers yields exactly one row, and groups that only appear in
//! sales are ignored.

use credit_core::models::{
    penetration_rate, DistributorPenetration, MunicipalityKey, MunicipalityPenetration,
    PotentialTable, SalesTable,
};
use tracing::info;

use crate::aggregator::{aggregate_potential, aggregate_sales};

// ── Distributor ───────────────────────────────────────────────────────────────

/// Penetration metrics per distributor, sorted by distributor name.
pub fn analyze_distributors(
    potential: &PotentialTable,
    sales: &SalesTable,
) -> Vec<DistributorPenetration> {
    let potential_groups = aggregate_potential(&potential.records, |r| r.distributor.clone());
    let sales_groups = aggregate_sales(&sales.records, |r| r.distributor_channel.clone());

    let rows: Vec<DistributorPenetration> = potential_groups
        .into_iter()
        .map(|(distributor, pot)| {
            let matched = sales_groups.get(&distributor);
            let customers_with_credit = matched.map(|s| s.customers_with_credit());
            DistributorPenetration {
                distributor,
                potential_customer_count: pot.customer_count,
                total_credit_limit: pot.total_credit_limit(),
                customers_with_credit,
                total_sales_value: matched.map(|s| s.total_sales_value()),
                average_ticket: matched.and_then(|s| s.average_ticket()),
                penetration_rate: penetration_rate(customers_with_credit, pot.customer_count),
            }
        })
        .collect();

    let unmatched = rows.iter().filter(|r| r.customers_with_credit.is_none()).count();
    info!(
        "Distributor analysis: {} distributors, {} without delivered sales",
        rows.len(),
        unmatched
    );
    rows
}

// ── Municipality ──────────────────────────────────────────────────────────────

/// Penetration metrics per (distributor, department, municipality), sorted by
/// that key.
pub fn analyze_municipalities(
    potential: &PotentialTable,
    sales: &SalesTable,
) -> Vec<MunicipalityPenetration> {
    let potential_groups = aggregate_potential(&potential.records, |r| {
        Some(MunicipalityKey {
            distributor: r.distributor.clone()?,
            department: r.department.clone()?,
            municipality: r.municipality.clone()?,
        })
    });
    let sales_groups = aggregate_sales(&sales.records, |r| {
        Some(MunicipalityKey {
            distributor: r.distributor_channel.clone()?,
            department: r.department.clone()?,
            municipality: r.municipality.clone()?,
        })
    });

    let rows: Vec<MunicipalityPenetration> = potential_groups
        .into_iter()
        .map(|(key, pot)| {
            let matched = sales_groups.get(&key);
            let customers_with_credit = matched.map(|s| s.customers_with_credit());
            MunicipalityPenetration {
                distributor: key.distributor,
                department: key.department,
                municipality: key.municipality,
                potential_customer_count: pot.customer_count,
                total_credit_limit: pot.total_credit_limit(),
                customers_with_credit,
                total_sales_value: matched.map(|s| s.total_sales_value()),
                average_ticket: matched.and_then(|s| s.average_ticket()),
                average_installments: matched.and_then(|s| s.average_installments()),
                penetration_rate: penetration_rate(customers_with_credit, pot.customer_count),
            }
        })
        .collect();

    info!("Municipality analysis: {} groups", rows.len());
    rows
}

// ── Tests ─────────────────────────────────────────────────────────────────────
