//! Async pipeline orchestrator.
//!
//! Runs the pipeline as four stages of concurrent tasks on tokio's blocking
//! pool: load (three sources) → clean (potential, sales) → analyze
//! (distributor, municipality) → sinks (report, persistence). Stage inputs
//! are shared as `Arc` snapshots, so no task ever mutates another's data.
//! The first failing task aborts the run.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use credit_core::error::{PipelineError, Result};
use credit_core::models::{
    penetration_rate, DistributorPenetration, MunicipalityPenetration, PotentialTable, SalesTable,
};
use credit_core::sinks::{table_names, PersistenceSink, ReportSink, TableSet};
use credit_core::sources::{SourceSet, SourceSpec};
use credit_core::table::{RawTable, Table, ToTable};
use credit_data::analysis::{analyze_distributors, analyze_municipalities};
use credit_data::cleaner::{clean_potential, clean_sales, DEFAULT_DELIVERED_STATUS};
use credit_data::reader::load_source;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ── Public types ──────────────────────────────────────────────────────────────

/// Row counts and timings of one successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// RFC 3339 timestamp when the run finished.
    pub generated_at: String,
    /// Status value the sales cleaner kept.
    pub delivered_status: String,
    pub potential_rows: usize,
    /// Sales rows read from the source, before the status filter.
    pub sales_rows: usize,
    /// Sales rows that survived the status filter.
    pub delivered_sales_rows: usize,
    pub summary_rows: usize,
    pub distributor_rows: usize,
    pub municipality_rows: usize,
    /// Distributors with potential customers but no delivered sales.
    pub distributors_without_sales: usize,
    /// Customers with credit over potential customers, across all
    /// distributors.
    pub overall_penetration_rate: Option<f64>,
    pub load_time_seconds: f64,
    pub clean_time_seconds: f64,
    pub analyze_time_seconds: f64,
    pub sink_time_seconds: f64,
}

/// Outputs of the analysis stage.
#[derive(Debug, Clone, PartialEq)]
pub struct PenetrationResults {
    pub distributor: Vec<DistributorPenetration>,
    pub municipality: Vec<MunicipalityPenetration>,
}

// ── PipelineRunner ────────────────────────────────────────────────────────────

/// Executes one full pipeline run against injected sinks.
pub struct PipelineRunner {
    sources: SourceSet,
    delivered_status: String,
    report: Arc<dyn ReportSink>,
    store: Arc<dyn PersistenceSink>,
}

impl PipelineRunner {
    pub fn new(
        sources: SourceSet,
        report: Arc<dyn ReportSink>,
        store: Arc<dyn PersistenceSink>,
    ) -> Self {
        Self {
            sources,
            delivered_status: DEFAULT_DELIVERED_STATUS.to_string(),
            report,
            store,
        }
    }

    /// Override the sale status kept by the sales cleaner.
    pub fn with_delivered_status(mut self, status: impl Into<String>) -> Self {
        self.delivered_status = status.into();
        self
    }

    /// Run every stage and hand the results to both sinks.
    pub async fn run(&self) -> Result<RunSummary> {
        // ── Stage 1: Load ─────────────────────────────────────────────────────
        let started = Instant::now();
        let (potential_raw, sales_raw, summary_raw) = tokio::try_join!(
            load_task(&self.sources.potential),
            load_task(&self.sources.sales),
            load_task(&self.sources.summary),
        )?;
        let load_time = started.elapsed().as_secs_f64();
        info!(
            "Loaded sources: potential={} sales={} summary={} rows",
            potential_raw.len(),
            sales_raw.len(),
            summary_raw.len()
        );

        // ── Stage 2: Clean ────────────────────────────────────────────────────
        let started = Instant::now();
        let (potential, sales) = tokio::try_join!(
            blocking("clean potential", {
                let raw = Arc::clone(&potential_raw);
                move || clean_potential(&raw)
            }),
            blocking("clean sales", {
                let raw = Arc::clone(&sales_raw);
                let status = self.delivered_status.clone();
                move || clean_sales(&raw, &status)
            }),
        )?;
        let (potential, sales) = (Arc::new(potential), Arc::new(sales));
        let clean_time = started.elapsed().as_secs_f64();

        // ── Stage 3: Analyze ──────────────────────────────────────────────────
        let started = Instant::now();
        let results = analyze(Arc::clone(&potential), Arc::clone(&sales)).await?;
        let results = Arc::new(results);
        let analyze_time = started.elapsed().as_secs_f64();

        // ── Stage 4: Sinks ────────────────────────────────────────────────────
        let started = Instant::now();
        tokio::try_join!(
            blocking("render report", {
                let report = Arc::clone(&self.report);
                let results = Arc::clone(&results);
                move || report.render(&results.distributor, &results.municipality)
            }),
            blocking("persist tables", {
                let store = Arc::clone(&self.store);
                let potential = Arc::clone(&potential);
                let sales = Arc::clone(&sales);
                let summary = Arc::clone(&summary_raw);
                let results = Arc::clone(&results);
                move || store.persist(&build_tables(&potential, &sales, &summary, &results))
            }),
        )?;
        let sink_time = started.elapsed().as_secs_f64();

        let summary = RunSummary {
            generated_at: Utc::now().to_rfc3339(),
            delivered_status: self.delivered_status.clone(),
            potential_rows: potential.records.len(),
            sales_rows: sales_raw.len(),
            delivered_sales_rows: sales.records.len(),
            summary_rows: summary_raw.len(),
            distributor_rows: results.distributor.len(),
            municipality_rows: results.municipality.len(),
            distributors_without_sales: results
                .distributor
                .iter()
                .filter(|r| r.customers_with_credit.is_none())
                .count(),
            overall_penetration_rate: overall_rate(&results.distributor),
            load_time_seconds: load_time,
            clean_time_seconds: clean_time,
            analyze_time_seconds: analyze_time,
            sink_time_seconds: sink_time,
        };
        info!(
            "Pipeline finished: {} distributors, {} municipality groups",
            summary.distributor_rows, summary.municipality_rows
        );
        Ok(summary)
    }
}

/// Assemble the five persisted tables.
pub fn build_tables(
    potential: &PotentialTable,
    sales: &SalesTable,
    summary: &RawTable,
    results: &PenetrationResults,
) -> TableSet {
    let entries: [(&str, Table); 5] = [
        (table_names::POTENTIAL, potential.to_table()),
        (table_names::SALES, sales.to_table()),
        (table_names::SUMMARY, Table::from_raw(summary)),
        (
            table_names::DISTRIBUTOR_PENETRATION,
            results.distributor.to_table(),
        ),
        (
            table_names::MUNICIPALITY_PENETRATION,
            results.municipality.to_table(),
        ),
    ];
    entries
        .into_iter()
        .map(|(name, table)| (name.to_string(), table))
        .collect()
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn overall_rate(rows: &[DistributorPenetration]) -> Option<f64> {
    let potential: u64 = rows.iter().map(|r| r.potential_customer_count).sum();
    let customers: u64 = rows.iter().filter_map(|r| r.customers_with_credit).sum();
    penetration_rate(Some(customers), potential)
}

async fn load_task(spec: &SourceSpec) -> Result<Arc<RawTable>> {
    let spec = spec.clone();
    debug!("Loading source '{}' from {}", spec.name, spec.path.display());
    blocking("load source", move || load_source(&spec).map(Arc::new)).await
}

async fn analyze(
    potential: Arc<PotentialTable>,
    sales: Arc<SalesTable>,
) -> Result<PenetrationResults> {
    let (distributor, municipality) = tokio::try_join!(
        blocking("analyze distributors", {
            let (potential, sales) = (Arc::clone(&potential), Arc::clone(&sales));
            move || Ok(analyze_distributors(&potential, &sales))
        }),
        blocking("analyze municipalities", {
            let (potential, sales) = (Arc::clone(&potential), Arc::clone(&sales));
            move || Ok(analyze_municipalities(&potential, &sales))
        }),
    )?;
    Ok(PenetrationResults {
        distributor,
        municipality,
    })
}

/// Run `f` on the blocking pool, turning a panic or cancellation into
/// [`PipelineError::Task`].
async fn blocking<T, F>(task: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::Task {
            task: task.to_string(),
            reason: e.to_string(),
        })?
}

// ── Tests ─────────────────────────────────────────────────────────────────────
