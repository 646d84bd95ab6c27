//! Cross-node summary statistics.

/// Mean, population standard deviation, min and max over per-node percentages
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor `count`, not `count - 1`)
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStatistics {
    /// Reduce a set of per-node values.
    ///
    /// Returns `None` for an empty set; there is no meaningful mean of zero
    /// nodes.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}
