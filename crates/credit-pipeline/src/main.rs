mod bootstrap;

use std::sync::Arc;

use anyhow::Result;
use credit_core::formatting::{format_count, format_number, format_rate};
use credit_core::settings::Settings;
use credit_data::store::SqliteStore;
use credit_report::{ChartFormat, ChartReport, ChartTheme, ReportConfig};
use credit_runtime::PipelineRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;
    bootstrap::ensure_directories(&[settings.output_dir.as_path(), settings.charts_dir.as_path()])?;

    tracing::info!("Credit pipeline v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Output: {}, Charts: {} ({}), Delivered status: {}",
        settings.data_dir.display(),
        settings.output_dir.display(),
        settings.charts_dir.display(),
        settings.chart_format,
        settings.delivered_status
    );

    let report = ChartReport::new(
        ReportConfig::new(&settings.charts_dir)
            .with_format(ChartFormat::from_name(&settings.chart_format))
            .with_theme(ChartTheme::from_name(&settings.theme)),
    );
    let store = SqliteStore::new(settings.database_path());

    let runner = PipelineRunner::new(settings.sources(), Arc::new(report), Arc::new(store))
        .with_delivered_status(settings.delivered_status.clone());

    let summary = match runner.run().await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Pipeline failed: {}", e);
            return Err(e.into());
        }
    };

    let summary_path = bootstrap::write_run_summary(&settings.output_dir, &summary)?;

    tracing::info!(
        "Processed {} potential customers and {} delivered sales",
        format_count(summary.potential_rows),
        format_count(summary.delivered_sales_rows)
    );
    tracing::info!(
        "{} distributors ({} without sales), {} municipality groups in {}s",
        format_count(summary.distributor_rows),
        format_count(summary.distributors_without_sales),
        format_count(summary.municipality_rows),
        format_number(
            summary.load_time_seconds
                + summary.clean_time_seconds
                + summary.analyze_time_seconds
                + summary.sink_time_seconds,
            2
        )
    );
    tracing::info!(
        "Overall penetration rate: {}",
        format_rate(summary.overall_penetration_rate)
    );
    tracing::info!("Run summary written to {}", summary_path.display());

    Ok(())
}
