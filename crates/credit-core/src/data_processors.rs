use chrono::{DateTime, NaiveDate, NaiveDateTime};

// ── NumericCoercer ────────────────────────────────────────────────────────────

/// Lenient conversion of exported text fields into numbers.
pub struct NumericCoercer;

impl NumericCoercer {
    /// Parse `value` as a finite `f64`.
    ///
    /// Surrounding whitespace is ignored. Anything else that is not a plain
    /// decimal or scientific literal (thousands separators, currency signs,
    /// `NaN`, `inf`) yields `None`.
    pub fn coerce(value: Option<&str>) -> Option<f64> {
        let trimmed = value?.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

// ── SaleDateProcessor ─────────────────────────────────────────────────────────

/// Parses sale dates from the formats seen in sales exports.
pub struct SaleDateProcessor;

impl SaleDateProcessor {
    const DATETIME_FORMATS: &'static [&'static str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
    ];

    const DATE_FORMATS: &'static [&'static str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

    /// Attempt to parse `value` into a naive date-time.
    ///
    /// Offsets in RFC 3339 input are dropped after conversion to the
    /// offset's local wall-clock time. Date-only values map to midnight.
    /// Returns `None` for empty or unrecognised values.
    pub fn parse(value: Option<&str>) -> Option<NaiveDateTime> {
        let s = value?.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }

        for fmt in Self::DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(naive);
            }
        }

        for fmt in Self::DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return date.and_hms_opt(0, 0, 0);
            }
        }

        None
    }
}

// ── Text normalisation ────────────────────────────────────────────────────────

/// Upper-case a geography name. `None` stays `None`.
pub fn upper_case(value: Option<&str>) -> Option<String> {
    value.map(str::to_uppercase)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
