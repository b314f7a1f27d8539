use std::path::{Path, PathBuf};

use credit_runtime::RunSummary;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File written next to the database after a successful run.
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure every output directory exists, creating missing parents.
pub fn ensure_directories(dirs: &[&Path]) -> anyhow::Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a configured level name to an [`EnvFilter`] directive.
///
/// Accepts `DEBUG`, `INFO`, `WARNING` and `ERROR` in any case; anything else
/// is passed through unchanged.
pub fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, writing to stderr.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()?;

    Ok(())
}

// ── Run summary ────────────────────────────────────────────────────────────────

/// Write `summary` as pretty JSON into `output_dir`.
pub fn write_run_summary(output_dir: &Path, summary: &RunSummary) -> anyhow::Result<PathBuf> {
    let path = output_dir.join(RUN_SUMMARY_FILE);
    std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    Ok(path)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ── ensure_directories ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_directories_creates_nested() {
        let tmp = TempDir::new().expect("tempdir");
        let output = tmp.path().join("out");
        let charts = tmp.path().join("reports").join("charts");

        ensure_directories(&[output.as_path(), charts.as_path()]).expect("ensure_directories should succeed");

        assert!(output.is_dir());
        assert!(charts.is_dir());
    }

    #[test]
    fn test_ensure_directories_existing_is_ok() {
        let tmp = TempDir::new().expect("tempdir");
        ensure_directories(&[tmp.path()]).expect("existing dir must be accepted");
    }

    // ── filter_directive ──────────────────────────────────────────────────────

    #[test]
    fn test_filter_directive_maps_level_names() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("ERROR"), "error");
        assert_eq!(filter_directive("credit_data=trace"), "credit_data=trace");
    }

    // ── write_run_summary ─────────────────────────────────────────────────────

    #[test]
    fn test_write_run_summary() {
        let tmp = TempDir::new().expect("tempdir");
        let summary = RunSummary {
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            delivered_status: "Delivered".to_string(),
            potential_rows: 3,
            sales_rows: 4,
            delivered_sales_rows: 2,
            summary_rows: 1,
            distributor_rows: 2,
            municipality_rows: 3,
            distributors_without_sales: 1,
            overall_penetration_rate: Some(25.0),
            load_time_seconds: 0.01,
            clean_time_seconds: 0.0,
            analyze_time_seconds: 0.0,
            sink_time_seconds: 0.02,
        };

        let path = write_run_summary(tmp.path(), &summary).expect("write summary");

        assert_eq!(path, tmp.path().join(RUN_SUMMARY_FILE));
        let text = std::fs::read_to_string(&path).unwrap();
        let back: RunSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(back, summary);
    }
}
