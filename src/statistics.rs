//! Summary statistics over the values of the rendered chart items.

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Median; the average of the two middle values for even lengths, 0 when empty.
pub fn median(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Population standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[u64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn from_counts(values: &[u64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            median: median(values),
            std_dev: std_dev(values),
        }
    }

    /// Status line shown after a recomputation.
    pub fn status_text(&self) -> String {
        format!("Stats: mean={:.1}, median={:.1}", self.mean, self.median)
    }

    pub fn std_dev_text(&self) -> String {
        format!("Std. dev.: {:.2}", self.std_dev)
    }
}
