//! Row selections used by the report: best penetration and untapped
//! opportunities.

use std::cmp::Ordering;

use credit_core::models::{DistributorPenetration, MunicipalityPenetration};
use credit_core::stats::{median, percentile_of};

/// Count and rate accessors shared by the penetration result rows.
pub trait PenetrationRow {
    fn potential_customer_count(&self) -> u64;
    fn penetration_rate(&self) -> Option<f64>;
}

impl PenetrationRow for DistributorPenetration {
    fn potential_customer_count(&self) -> u64 {
        self.potential_customer_count
    }

    fn penetration_rate(&self) -> Option<f64> {
        self.penetration_rate
    }
}

impl PenetrationRow for MunicipalityPenetration {
    fn potential_customer_count(&self) -> u64 {
        self.potential_customer_count
    }

    fn penetration_rate(&self) -> Option<f64> {
        self.penetration_rate
    }
}

/// The first `n` rows by penetration rate, highest first.
///
/// Rows without a rate sort after every rated row. Ties keep input order.
pub fn top_by_penetration<T: PenetrationRow>(rows: &[T], n: usize) -> Vec<&T> {
    let mut ranked: Vec<&T> = rows.iter().collect();
    ranked.sort_by(|a, b| rate_descending(a.penetration_rate(), b.penetration_rate()));
    ranked.truncate(n);
    ranked
}

/// Rows with many potential customers but below-median penetration.
///
/// A row qualifies when its potential-customer count is strictly above the
/// 75th percentile of all counts and its rate is strictly below the median
/// of the non-null rates. Qualifying rows are ordered by count, largest
/// first, and cut to `n`.
pub fn opportunities<T: PenetrationRow>(rows: &[T], n: usize) -> Vec<&T> {
    let count_threshold = match percentile_of(
        rows.iter().map(|r| r.potential_customer_count() as f64),
        75.0,
    ) {
        Some(t) => t,
        None => return Vec::new(),
    };
    let rate_threshold = match median(rows.iter().filter_map(|r| r.penetration_rate())) {
        Some(t) => t,
        None => return Vec::new(),
    };

    let mut selected: Vec<&T> = rows
        .iter()
        .filter(|r| r.potential_customer_count() as f64 > count_threshold)
        .filter(|r| r.penetration_rate().is_some_and(|rate| rate < rate_threshold))
        .collect();
    selected.sort_by(|a, b| b.potential_customer_count().cmp(&a.potential_customer_count()));
    selected.truncate(n);
    selected
}

fn rate_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
