use plotters::style::RGBColor;

/// Colour palette for rendered charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartTheme {
    // ── Canvas ───────────────────────────────────────────────────────────────
    pub background: RGBColor,
    pub text: RGBColor,
    pub axis: RGBColor,
    pub grid: RGBColor,

    // ── Bars ─────────────────────────────────────────────────────────────────
    /// Bars with a rate below 50 %.
    pub rate_low: RGBColor,
    /// Bars with a rate between 50 % and 80 %.
    pub rate_medium: RGBColor,
    /// Bars with a rate at or above 80 %.
    pub rate_high: RGBColor,
    /// Bars that plot a count rather than a rate.
    pub count: RGBColor,
}

impl ChartTheme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// White canvas with dark text (default).
    pub fn light() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(33, 33, 33),
            axis: RGBColor(97, 97, 97),
            grid: RGBColor(224, 224, 224),

            rate_low: RGBColor(229, 115, 115),
            rate_medium: RGBColor(255, 183, 77),
            rate_high: RGBColor(102, 187, 106),
            count: RGBColor(66, 133, 244),
        }
    }

    /// Dark canvas for slide decks and dark dashboards.
    pub fn dark() -> Self {
        Self {
            background: RGBColor(30, 30, 30),
            text: RGBColor(238, 238, 238),
            axis: RGBColor(189, 189, 189),
            grid: RGBColor(66, 66, 66),

            rate_low: RGBColor(239, 83, 80),
            rate_medium: RGBColor(255, 202, 40),
            rate_high: RGBColor(129, 199, 132),
            count: RGBColor(100, 181, 246),
        }
    }

    /// Construct a theme by name. Unknown names fall back to `light`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Bar colour for a penetration rate.
    ///
    /// * `< 50 %`  → `rate_low`
    /// * `50–80 %` → `rate_medium`
    /// * `≥ 80 %`  → `rate_high`
    pub fn rate_color(&self, rate: f64) -> RGBColor {
        if rate >= 80.0 {
            self.rate_high
        } else if rate >= 50.0 {
            self.rate_medium
        } else {
            self.rate_low
        }
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
