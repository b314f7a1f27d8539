//! Grouped statistics over cleaned potential and sales records.
//!
//! Both aggregations are driven by a caller-supplied key function. Records
//! whose key is `None` are left out, and groups come back in ascending key
//! order.

use std::collections::{BTreeMap, HashSet};

use credit_core::models::{PotentialRecord, SaleRecord};
use credit_core::stats::MeanAccumulator;

// ── PotentialStats ────────────────────────────────────────────────────────────

/// Potential-side totals for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PotentialStats {
    /// Number of potential customers (rows) in the group.
    pub customer_count: u64,
    credit: MeanAccumulator,
}

impl PotentialStats {
    pub fn add_record(&mut self, record: &PotentialRecord) {
        self.customer_count += 1;
        self.credit.add(record.credit_limit);
    }

    /// Sum of non-null credit limits; 0 when the group has none.
    pub fn total_credit_limit(&self) -> f64 {
        self.credit.sum()
    }
}

// ── SalesStats ────────────────────────────────────────────────────────────────

/// Sales-side totals for one group.
#[derive(Debug, Clone, Default)]
pub struct SalesStats {
    customers: HashSet<String>,
    value: MeanAccumulator,
    installments: MeanAccumulator,
}

impl SalesStats {
    pub fn add_record(&mut self, record: &SaleRecord) {
        if let Some(id) = &record.customer_document_id {
            self.customers.insert(id.clone());
        }
        self.value.add(record.total_value);
        self.installments.add(record.installments);
    }

    /// Distinct non-null customer document ids.
    pub fn customers_with_credit(&self) -> u64 {
        self.customers.len() as u64
    }

    pub fn total_sales_value(&self) -> f64 {
        self.value.sum()
    }

    pub fn average_ticket(&self) -> Option<f64> {
        self.value.mean()
    }

    pub fn average_installments(&self) -> Option<f64> {
        self.installments.mean()
    }
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Group potential records by `key_fn`.
pub fn aggregate_potential<K: Ord>(
    records: &[PotentialRecord],
    key_fn: impl Fn(&PotentialRecord) -> Option<K>,
) -> BTreeMap<K, PotentialStats> {
    let mut map: BTreeMap<K, PotentialStats> = BTreeMap::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            map.entry(key).or_default().add_record(record);
        }
    }
    map
}

/// Group sale records by `key_fn`.
pub fn aggregate_sales<K: Ord>(
    records: &[SaleRecord],
    key_fn: impl Fn(&SaleRecord) -> Option<K>,
) -> BTreeMap<K, SalesStats> {
    let mut map: BTreeMap<K, SalesStats> = BTreeMap::new();
    for record in records {
        if let Some(key) = key_fn(record) {
            map.entry(key).or_default().add_record(record);
        }
    }
    map
}

// ── Tests ─────────────────────────────────────────────────────────────────────
