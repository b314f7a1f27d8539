use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the credit penetration pipeline.
///
/// Only structural problems surface here. Malformed values inside a cell are
/// absorbed by the cleaners and become nulls.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source file is missing or cannot be read as a delimited table.
    #[error("Failed to read source '{source_name}' at {path}: {reason}")]
    SourceRead {
        source_name: String,
        path: PathBuf,
        reason: String,
    },

    /// A table is missing a column its consumer requires.
    #[error("Table '{table}' is missing required column '{column}'")]
    Schema { table: String, column: String },

    /// The relational store rejected a write; nothing was committed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A chart could not be rendered or written.
    #[error("Report error: {0}")]
    Report(String),

    /// A pipeline task panicked or was cancelled before producing output.
    #[error("Task '{task}' failed: {reason}")]
    Task { task: String, reason: String },

    /// Pass-through for any raw I/O error that does not carry a source name.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Build a [`PipelineError::SourceRead`] from any displayable cause.
    pub fn source_read(
        source_name: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`PipelineError::Schema`] for `table` lacking `column`.
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Convenience alias used throughout the pipeline crates.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source_read() {
        let err = PipelineError::source_read("sales", "/data/sales.csv", "no such file");
        let msg = err.to_string();
        assert!(msg.contains("Failed to read source 'sales'"));
        assert!(msg.contains("/data/sales.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_schema() {
        let err = PipelineError::schema("potential", "credit_limit");
        assert_eq!(
            err.to_string(),
            "Table 'potential' is missing required column 'credit_limit'"
        );
    }

    #[test]
    fn test_error_display_persistence() {
        let err = PipelineError::Persistence("disk full".to_string());
        assert_eq!(err.to_string(), "Persistence error: disk full");
    }

    #[test]
    fn test_error_display_report() {
        let err = PipelineError::Report("no font".to_string());
        assert_eq!(err.to_string(), "Report error: no font");
    }

    #[test]
    fn test_error_display_task() {
        let err = PipelineError::Task {
            task: "clean_sales".to_string(),
            reason: "panicked".to_string(),
        };
        assert_eq!(err.to_string(), "Task 'clean_sales' failed: panicked");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PipelineError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: PipelineError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
