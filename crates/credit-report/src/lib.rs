//! Chart report for the credit penetration pipeline.
//!
//! Builds backend-independent chart descriptions from the penetration
//! results and renders them as PNG or SVG bar charts with [`plotters`].

pub mod charts;
pub mod themes;

pub use charts::{ChartFormat, ChartReport, ReportConfig};
pub use themes::ChartTheme;
