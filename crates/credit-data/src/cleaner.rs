//! Normalisation of the raw potential-customers and sales tables.
//!
//! Both cleaners resolve their schema before touching any row, never mutate
//! their input, and absorb malformed values as nulls. Only the sales cleaner
//! removes rows, and only through the delivered-status filter.

use credit_core::data_processors::{upper_case, NumericCoercer, SaleDateProcessor};
use credit_core::error::Result;
use credit_core::models::{PotentialRecord, PotentialTable, SaleRecord, SalesTable};
use credit_core::schema::{potential, sales, ResolvedSchema, POTENTIAL_SCHEMA, SALES_SCHEMA};
use credit_core::table::RawTable;
use chrono::Datelike;
use tracing::{debug, info, warn};

/// Status kept by [`clean_sales`] unless configured otherwise.
pub const DEFAULT_DELIVERED_STATUS: &str = "Delivered";

// ── Potential ─────────────────────────────────────────────────────────────────

/// Normalise the potential-customers table.
///
/// * `department` and `municipality` are upper-cased.
/// * `credit_limit` and `stratum` are coerced to numbers; failures are null.
/// * Every input row produces exactly one output row.
pub fn clean_potential(raw: &RawTable) -> Result<PotentialTable> {
    let schema = POTENTIAL_SCHEMA.resolve(raw)?;
    let col = |n: usize| schema.index(n);

    let mut malformed_limits = 0usize;
    let records: Vec<PotentialRecord> = (0..raw.len())
        .map(|row| {
            let limit_text = raw.cell(row, col(potential::CREDIT_LIMIT));
            let credit_limit = NumericCoercer::coerce(limit_text);
            if limit_text.is_some() && credit_limit.is_none() {
                malformed_limits += 1;
            }

            PotentialRecord {
                code: owned(raw.cell(row, col(potential::CODE))),
                distributor: owned(raw.cell(row, col(potential::DISTRIBUTOR))),
                department: upper_case(raw.cell(row, col(potential::DEPARTMENT))),
                municipality: upper_case(raw.cell(row, col(potential::MUNICIPALITY))),
                credit_limit,
                stratum: NumericCoercer::coerce(raw.cell(row, col(potential::STRATUM))),
                extra: extra_values(raw, row, &schema),
            }
        })
        .collect();

    if malformed_limits > 0 {
        warn!(
            "{} potential rows had a non-numeric credit limit; stored as null",
            malformed_limits
        );
    }
    info!("Cleaned potential table: {} rows", records.len());

    Ok(PotentialTable {
        extra_columns: extra_headers(raw, &schema),
        records,
    })
}

// ── Sales ─────────────────────────────────────────────────────────────────────

/// Normalise the sales table and keep only delivered sales.
///
/// Every row is normalised first (date parsing, year/month derivation,
/// geography upper-casing, numeric coercion) and only then filtered on
/// `sale_status == delivered_status`, so a delivered sale with a malformed
/// date or value survives with nulls in those fields.
pub fn clean_sales(raw: &RawTable, delivered_status: &str) -> Result<SalesTable> {
    let schema = SALES_SCHEMA.resolve(raw)?;
    let col = |n: usize| schema.index(n);

    let normalised: Vec<SaleRecord> = (0..raw.len())
        .map(|row| {
            let sale_date = SaleDateProcessor::parse(raw.cell(row, col(sales::SALE_DATE)));
            SaleRecord {
                sale_date,
                year: sale_date.map(|d| d.year()),
                month: sale_date.map(|d| d.month()),
                distributor_channel: owned(raw.cell(row, col(sales::DISTRIBUTOR_CHANNEL))),
                department: upper_case(raw.cell(row, col(sales::DEPARTMENT))),
                municipality: upper_case(raw.cell(row, col(sales::MUNICIPALITY))),
                customer_document_id: owned(raw.cell(row, col(sales::CUSTOMER_DOCUMENT_ID))),
                total_value: NumericCoercer::coerce(raw.cell(row, col(sales::TOTAL_VALUE))),
                installments: NumericCoercer::coerce(raw.cell(row, col(sales::INSTALLMENTS))),
                sale_status: owned(raw.cell(row, col(sales::SALE_STATUS))),
                extra: extra_values(raw, row, &schema),
            }
        })
        .collect();

    let total = normalised.len();
    let records: Vec<SaleRecord> = normalised
        .into_iter()
        .filter(|r| r.sale_status.as_deref() == Some(delivered_status))
        .collect();

    let undated = records.iter().filter(|r| r.sale_date.is_none()).count();
    if undated > 0 {
        warn!("{} delivered sales have an unparseable sale date", undated);
    }
    debug!(
        "Sales status filter '{}': kept {}, dropped {}",
        delivered_status,
        records.len(),
        total - records.len()
    );
    info!("Cleaned sales table: {} delivered rows", records.len());

    Ok(SalesTable {
        extra_columns: extra_headers(raw, &schema),
        records,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

fn extra_headers(raw: &RawTable, schema: &ResolvedSchema) -> Vec<String> {
    schema
        .extra
        .iter()
        .map(|&i| raw.headers[i].clone())
        .collect()
}

fn extra_values(raw: &RawTable, row: usize, schema: &ResolvedSchema) -> Vec<Option<String>> {
    schema
        .extra
        .iter()
        .map(|&i| owned(raw.cell(row, i)))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use credit_core::error::PipelineError;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn raw(source: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            source,
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    const POTENTIAL_HEADERS: &[&str] = &[
        "code",
        "distributor",
        "department",
        "municipality",
        "credit_limit",
        "stratum",
    ];

    const SALES_HEADERS: &[&str] = &[
        "sale_date",
        "distributor_channel",
        "department",
        "municipality",
        "customer_document_id",
        "total_value",
        "installments",
        "sale_status",
    ];

    // ── clean_potential ───────────────────────────────────────────────────────

    #[test]
    fn test_potential_upper_cases_geography() {
        let input = raw(
            "potential",
            POTENTIAL_HEADERS,
            &[&["1", "A", "antioquia", "Medellín", "100", "3"]],
        );
        let cleaned = clean_potential(&input).unwrap();

        let r = &cleaned.records[0];
        assert_eq!(r.department.as_deref(), Some("ANTIOQUIA"));
        assert_eq!(r.municipality.as_deref(), Some("MEDELLÍN"));
        assert_eq!(r.credit_limit, Some(100.0));
        assert_eq!(r.stratum, Some(3.0));
    }

    #[test]
    fn test_potential_malformed_numbers_become_null_and_row_kept() {
        let input = raw(
            "potential",
            POTENTIAL_HEADERS,
            &[
                &["1", "A", "x", "y", "abc", "n/a"],
                &["2", "A", "x", "y", "", "2"],
            ],
        );
        let cleaned = clean_potential(&input).unwrap();

        assert_eq!(cleaned.records.len(), 2);
        assert_eq!(cleaned.records[0].credit_limit, None);
        assert_eq!(cleaned.records[0].stratum, None);
        assert_eq!(cleaned.records[1].credit_limit, None);
        assert_eq!(cleaned.records[1].stratum, Some(2.0));
    }

    #[test]
    fn test_potential_null_geography_stays_null() {
        let input = raw(
            "potential",
            POTENTIAL_HEADERS,
            &[&["1", "A", "", "", "1", "1"]],
        );
        let cleaned = clean_potential(&input).unwrap();
        assert_eq!(cleaned.records[0].department, None);
        assert_eq!(cleaned.records[0].municipality, None);
    }

    #[test]
    fn test_potential_is_deterministic_and_input_untouched() {
        let input = raw(
            "potential",
            POTENTIAL_HEADERS,
            &[
                &["1", "A", "caldas", "manizales", "10.5", "2"],
                &["2", "B", "Huila", "neiva", "bad", "x"],
            ],
        );
        let before = input.clone();

        let first = clean_potential(&input).unwrap();
        let second = clean_potential(&input).unwrap();

        assert_eq!(first, second);
        assert_eq!(input, before);
    }

    #[test]
    fn test_potential_accepts_export_headers_and_keeps_extras() {
        let input = raw(
            "potential",
            &[
                "Codigo",
                "Distribuidora",
                "nombreDepartamento",
                "municipio",
                "Cupo",
                "estrato",
                "segmento",
            ],
            &[&["7", "GASES", "cesar", "valledupar", "2500000", "1", "oro"]],
        );
        let cleaned = clean_potential(&input).unwrap();

        assert_eq!(cleaned.extra_columns, vec!["segmento"]);
        let r = &cleaned.records[0];
        assert_eq!(r.code.as_deref(), Some("7"));
        assert_eq!(r.department.as_deref(), Some("CESAR"));
        assert_eq!(r.credit_limit, Some(2_500_000.0));
        assert_eq!(r.extra, vec![Some("oro".to_string())]);
    }

    #[test]
    fn test_potential_missing_column_is_schema_error() {
        let input = raw(
            "potential",
            &["code", "distributor", "department", "municipality", "stratum"],
            &[],
        );
        let err = clean_potential(&input).unwrap_err();
        match err {
            PipelineError::Schema { table, column } => {
                assert_eq!(table, "potential");
                assert_eq!(column, "credit_limit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // ── clean_sales ───────────────────────────────────────────────────────────

    #[test]
    fn test_sales_keeps_only_delivered() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[
                &["2024-01-05", "A", "x", "y", "d1", "500", "12", "Delivered"],
                &["2024-01-06", "A", "x", "y", "d2", "999", "6", "Pending"],
                &["2024-01-07", "A", "x", "y", "d3", "10", "6", "delivered"],
                &["2024-01-08", "A", "x", "y", "d4", "10", "6", ""],
            ],
        );
        let cleaned = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap();

        assert_eq!(cleaned.records.len(), 1);
        assert!(cleaned
            .records
            .iter()
            .all(|r| r.sale_status.as_deref() == Some("Delivered")));
        assert_eq!(cleaned.records[0].total_value, Some(500.0));
    }

    #[test]
    fn test_sales_custom_status() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[
                &["2024-01-05", "A", "x", "y", "d1", "500", "12", "Entregado"],
                &["2024-01-06", "A", "x", "y", "d2", "999", "6", "Delivered"],
            ],
        );
        let cleaned = clean_sales(&input, "Entregado").unwrap();
        assert_eq!(cleaned.records.len(), 1);
        assert_eq!(cleaned.records[0].customer_document_id.as_deref(), Some("d1"));
    }

    #[test]
    fn test_sales_derives_year_and_month() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[&["2023-11-30 14:00:00", "A", "x", "y", "d1", "1", "1", "Delivered"]],
        );
        let cleaned = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap();

        let r = &cleaned.records[0];
        let date = r.sale_date.unwrap();
        assert_eq!(r.year, Some(date.year()));
        assert_eq!(r.month, Some(date.month()));
        assert_eq!((r.year, r.month), (Some(2023), Some(11)));
    }

    #[test]
    fn test_sales_malformed_date_and_value_survive_as_null() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[&["not-a-date", "A", "x", "y", "d1", "12,5", "three", "Delivered"]],
        );
        let cleaned = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap();

        assert_eq!(cleaned.records.len(), 1);
        let r = &cleaned.records[0];
        assert_eq!(r.sale_date, None);
        assert_eq!(r.year, None);
        assert_eq!(r.month, None);
        assert_eq!(r.total_value, None);
        assert_eq!(r.installments, None);
    }

    #[test]
    fn test_sales_date_null_iff_derived_fields_null() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[
                &["2024-02-29", "A", "x", "y", "d1", "1", "1", "Delivered"],
                &["", "A", "x", "y", "d2", "1", "1", "Delivered"],
                &["31/12/2022", "A", "x", "y", "d3", "1", "1", "Delivered"],
            ],
        );
        let cleaned = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap();

        for r in &cleaned.records {
            assert_eq!(r.sale_date.is_none(), r.year.is_none());
            assert_eq!(r.sale_date.is_none(), r.month.is_none());
        }
    }

    #[test]
    fn test_sales_upper_cases_geography() {
        let input = raw(
            "sales",
            SALES_HEADERS,
            &[&["2024-01-01", "A", "bolívar", "cartagena", "d1", "1", "1", "Delivered"]],
        );
        let cleaned = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap();
        assert_eq!(cleaned.records[0].department.as_deref(), Some("BOLÍVAR"));
        assert_eq!(cleaned.records[0].municipality.as_deref(), Some("CARTAGENA"));
        // Channel casing is left alone.
        assert_eq!(cleaned.records[0].distributor_channel.as_deref(), Some("A"));
    }

    #[test]
    fn test_sales_missing_column_is_schema_error() {
        let input = raw("sales", &SALES_HEADERS[..7], &[]);
        let err = clean_sales(&input, DEFAULT_DELIVERED_STATUS).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Schema { ref column, .. } if column == "sale_status"
        ));
    }
}
