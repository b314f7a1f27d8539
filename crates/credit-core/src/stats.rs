// ── Percentile helpers ────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation between closest ranks.
///
/// Returns `None` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> Option<f64> {
    let len = sorted_data.len();
    if len == 0 {
        return None;
    }
    if len == 1 {
        return Some(sorted_data[0]);
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted_data[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo]))
}

/// Percentile of unsorted values, ignoring non-finite entries.
pub fn percentile_of(values: impl IntoIterator<Item = f64>, p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    percentile(&sorted, p)
}

/// Median of unsorted values, ignoring non-finite entries.
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    percentile_of(values, 50.0)
}

// ── Running mean ──────────────────────────────────────────────────────────────

/// Accumulates a sum and count so a mean can be produced at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: u64,
}

impl MeanAccumulator {
    /// Add a value; `None` is skipped.
    pub fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    /// Sum of the values added so far (0 when none).
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Number of values added so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Arithmetic mean, or `None` when no value was added.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
