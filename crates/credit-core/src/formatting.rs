/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use credit_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Group on the absolute value; the sign is re-attached at the end.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Half-ULP nudge so exact midpoints like 1.005 round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` starts with "0.", e.g. "0.50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an optional penetration rate as a percentage with one decimal.
///
/// # Examples
///
/// ```
/// use credit_core::formatting::format_rate;
///
/// assert_eq!(format_rate(Some(12.345)), "12.3%");
/// assert_eq!(format_rate(None), "n/a");
/// ```
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) if r.is_finite() => format!("{}%", format_number(r, 1)),
        _ => "n/a".to_string(),
    }
}

/// Format a row count with thousands separators.
pub fn format_count(count: usize) -> String {
    group_thousands(&count.to_string())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_rounds_up() {
        assert_eq!(format_number(1.005, 2), "1.01");
    }

    // ── format_rate ──────────────────────────────────────────────────────────

    #[test]
    fn test_format_rate_values() {
        assert_eq!(format_rate(Some(100.0)), "100.0%");
        assert_eq!(format_rate(Some(0.04)), "0.0%");
    }

    #[test]
    fn test_format_rate_missing_or_nan() {
        assert_eq!(format_rate(None), "n/a");
        assert_eq!(format_rate(Some(f64::NAN)), "n/a");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(5), "5");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
