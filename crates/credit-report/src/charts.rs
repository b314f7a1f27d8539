//! Bar-chart report over the penetration results.
//!
//! Chart content is computed by [`build_charts`] without touching a drawing
//! backend; [`ChartReport`] only turns each [`ChartSpec`] into an image.

use std::path::{Path, PathBuf};

use credit_core::error::{PipelineError, Result};
use credit_core::models::{DistributorPenetration, MunicipalityPenetration};
use credit_core::sinks::ReportSink;
use credit_data::ranking::{opportunities, top_by_penetration};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::themes::ChartTheme;

/// Number of municipalities shown in the ranked charts.
pub const TOP_N: usize = 10;

const FONT: &str = "sans-serif";

// ── Configuration ─────────────────────────────────────────────────────────────

/// Image format of rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartFormat {
    #[default]
    Png,
    Svg,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Png => "png",
            ChartFormat::Svg => "svg",
        }
    }

    /// Parse a format name. Unknown names fall back to PNG.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "svg" => ChartFormat::Svg,
            _ => ChartFormat::Png,
        }
    }
}

/// Everything [`ChartReport`] needs to know about presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub format: ChartFormat,
    pub width: u32,
    pub height: u32,
    pub theme: ChartTheme,
}

impl ReportConfig {
    /// PNG, 1200x600, light theme.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: ChartFormat::Png,
            width: 1200,
            height: 600,
            theme: ChartTheme::light(),
        }
    }

    pub fn with_format(mut self, format: ChartFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_theme(mut self, theme: ChartTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Output path of the chart with the given file stem.
    pub fn chart_path(&self, file_stem: &str) -> PathBuf {
        self.output_dir
            .join(format!("{file_stem}.{}", self.format.extension()))
    }
}

// ── Chart content ─────────────────────────────────────────────────────────────

/// What a chart's bars measure; decides the bar colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Penetration rate in percent.
    Rate,
    /// Potential-customer count.
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Backend-independent description of one bar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub file_stem: &'static str,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub measure: Measure,
    pub bars: Vec<Bar>,
}

impl ChartSpec {
    /// Upper bound of the value axis, with headroom above the tallest bar.
    pub fn y_max(&self) -> f64 {
        let max = self.bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

/// The three report charts, in render order:
///
/// 1. `distributor_penetration`: rate per distributor.
/// 2. `top_municipalities`: the [`TOP_N`] municipalities with the highest rate.
/// 3. `opportunity_municipalities`: the [`TOP_N`] largest under-penetrated
///    municipalities by potential-customer count.
///
/// Missing rates are drawn as zero-height bars.
pub fn build_charts(
    distributor: &[DistributorPenetration],
    municipality: &[MunicipalityPenetration],
) -> Vec<ChartSpec> {
    let distributor_bars = distributor
        .iter()
        .map(|r| Bar {
            label: r.distributor.clone(),
            value: r.penetration_rate.unwrap_or(0.0),
        })
        .collect();

    let top_bars = top_by_penetration(municipality, TOP_N)
        .into_iter()
        .map(|r| Bar {
            label: municipality_label(r),
            value: r.penetration_rate.unwrap_or(0.0),
        })
        .collect();

    let opportunity_bars = opportunities(municipality, TOP_N)
        .into_iter()
        .map(|r| Bar {
            label: municipality_label(r),
            value: r.potential_customer_count as f64,
        })
        .collect();

    vec![
        ChartSpec {
            file_stem: "distributor_penetration",
            title: "Penetration rate by distributor".to_string(),
            x_label: "Distributor".to_string(),
            y_label: "Penetration (%)".to_string(),
            measure: Measure::Rate,
            bars: distributor_bars,
        },
        ChartSpec {
            file_stem: "top_municipalities",
            title: format!("Top {TOP_N} municipalities by penetration rate"),
            x_label: "Municipality".to_string(),
            y_label: "Penetration (%)".to_string(),
            measure: Measure::Rate,
            bars: top_bars,
        },
        ChartSpec {
            file_stem: "opportunity_municipalities",
            title: format!("Top {TOP_N} opportunity municipalities"),
            x_label: "Municipality".to_string(),
            y_label: "Potential customers".to_string(),
            measure: Measure::Count,
            bars: opportunity_bars,
        },
    ]
}

fn municipality_label(row: &MunicipalityPenetration) -> String {
    format!("{} ({})", row.municipality, row.distributor)
}

// ── ChartReport ───────────────────────────────────────────────────────────────

/// [`ReportSink`] that writes one image per [`ChartSpec`].
#[derive(Debug, Clone)]
pub struct ChartReport {
    config: ReportConfig,
}

impl ChartReport {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn render_chart(&self, spec: &ChartSpec) -> Result<PathBuf> {
        let path = self.config.chart_path(spec.file_stem);
        let size = (self.config.width, self.config.height);
        let theme = &self.config.theme;

        let drawn = match self.config.format {
            ChartFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                draw_bar_chart(&root, spec, theme).map_err(|e| e.to_string())
            }
            ChartFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                draw_bar_chart(&root, spec, theme).map_err(|e| e.to_string())
            }
        };
        drawn.map_err(|reason| report_error(&path, reason))?;

        debug!("Rendered chart {} ({} bars)", path.display(), spec.bars.len());
        Ok(path)
    }
}

impl ReportSink for ChartReport {
    fn render(
        &self,
        distributor: &[DistributorPenetration],
        municipality: &[MunicipalityPenetration],
    ) -> Result<()> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let charts = build_charts(distributor, municipality);
        for spec in &charts {
            self.render_chart(spec)?;
        }

        info!(
            "Rendered {} charts into {}",
            charts.len(),
            self.config.output_dir.display()
        );
        Ok(())
    }
}

// ── Drawing ───────────────────────────────────────────────────────────────────

fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    theme: &ChartTheme,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&theme.background)?;

    let bar_count = spec.bars.len().max(1) as i32;
    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, (FONT, 26).into_font().color(&theme.text))
        .margin(16)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..bar_count).into_segmented(), 0f64..spec.y_max())?;

    let labels: Vec<&str> = spec.bars.iter().map(|b| b.label.as_str()).collect();
    let label_of = |x: &SegmentValue<i32>| match x {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|l| l.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(spec.bars.len().max(1))
        .x_label_formatter(&label_of)
        .x_desc(spec.x_label.as_str())
        .y_desc(spec.y_label.as_str())
        .axis_style(theme.axis.stroke_width(1))
        .bold_line_style(theme.grid.stroke_width(1))
        .light_line_style(theme.background.stroke_width(0))
        .label_style((FONT, 12).into_font().color(&theme.text))
        .axis_desc_style((FONT, 15).into_font().color(&theme.text))
        .draw()?;

    chart.draw_series(spec.bars.iter().enumerate().map(|(i, bar)| {
        let color = match spec.measure {
            Measure::Rate => theme.rate_color(bar.value),
            Measure::Count => theme.count,
        };
        let i = i as i32;
        let mut rect = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), bar.value),
            ],
            color.filled(),
        );
        rect.set_margin(0, 0, 6, 6);
        rect
    }))?;

    root.present()?;
    Ok(())
}

fn report_error(path: &Path, reason: String) -> PipelineError {
    PipelineError::Report(format!("{}: {reason}", path.display()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
