use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::sources::SourceSet;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Credit-product market penetration pipeline
///
/// Every option has a default, so a bare invocation runs the whole pipeline
/// against `./data` and writes into `./output` and `./charts`.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "credit-pipeline",
    about = "Credit-product market penetration pipeline",
    version
)]
pub struct Settings {
    /// Directory holding the three source files
    #[arg(long, env = "CREDIT_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Potential-customers file name (semicolon-delimited, Latin-1)
    #[arg(long, default_value = "potential.csv")]
    pub potential_file: String,

    /// Sales-history file name (comma-delimited, UTF-8)
    #[arg(long, default_value = "sales.csv")]
    pub sales_file: String,

    /// Resolved-summary file name (semicolon-delimited, Windows-1252)
    #[arg(long, default_value = "summary.csv")]
    pub summary_file: String,

    /// Directory for the SQLite snapshot
    #[arg(long, env = "CREDIT_OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// SQLite database file name inside the output directory
    #[arg(long, default_value = "credit_analysis.db")]
    pub database: String,

    /// Directory for rendered charts
    #[arg(long, env = "CREDIT_CHARTS_DIR", default_value = "charts")]
    pub charts_dir: PathBuf,

    /// Chart image format
    #[arg(long, default_value = "png", value_parser = ["png", "svg"])]
    pub chart_format: String,

    /// Chart colour theme
    #[arg(long, default_value = "light", value_parser = ["light", "dark"])]
    pub theme: String,

    /// Sale status kept by the sales cleaner; every other status is dropped
    #[arg(long, env = "CREDIT_DELIVERED_STATUS", default_value = "Delivered")]
    pub delivered_status: String,

    /// Logging level
    #[arg(long, env = "CREDIT_LOG_LEVEL", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] with an explicit argument list, for tests.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// The three source descriptors resolved against `data_dir`.
    pub fn sources(&self) -> SourceSet {
        SourceSet::in_dir(
            &self.data_dir,
            &self.potential_file,
            &self.sales_file,
            &self.summary_file,
        )
    }

    /// Full path of the SQLite snapshot.
    pub fn database_path(&self) -> PathBuf {
        self.output_dir.join(&self.database)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        std::iter::once("credit-pipeline")
            .chain(list.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_defaults_need_no_arguments() {
        let settings = Settings::try_parse_from(args(&[])).expect("defaults must parse");
        assert_eq!(settings.potential_file, "potential.csv");
        assert_eq!(settings.chart_format, "png");
        assert_eq!(settings.theme, "light");
        assert!(!settings.debug);
    }

    #[test]
    fn test_database_path_joins_output_dir() {
        let settings = Settings::load_from_args(args(&[
            "--output-dir",
            "/tmp/out",
            "--database",
            "x.db",
        ]));
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/out/x.db"));
    }

    #[test]
    fn test_sources_resolve_against_data_dir() {
        let settings = Settings::load_from_args(args(&[
            "--data-dir",
            "/srv/feeds",
            "--sales-file",
            "historic.csv",
        ]));
        let sources = settings.sources();
        assert_eq!(sources.sales.path, PathBuf::from("/srv/feeds/historic.csv"));
        assert_eq!(
            sources.potential.path,
            PathBuf::from("/srv/feeds/potential.csv")
        );
    }

    #[test]
    fn test_debug_flag_overrides_log_level() {
        let settings = Settings::load_from_args(args(&["--log-level", "ERROR", "--debug"]));
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_delivered_status_override() {
        let settings = Settings::load_from_args(args(&["--delivered-status", "Entregado"]));
        assert_eq!(settings.delivered_status, "Entregado");
    }

    #[test]
    fn test_invalid_chart_format_rejected() {
        assert!(Settings::try_parse_from(args(&["--chart-format", "gif"])).is_err());
    }
}
