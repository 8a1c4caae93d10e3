//! Statistical Features Computation

/// Summary statistics for a series
#[derive(Debug, Clone, Default)]
pub struct StatisticalFeatures {
    /// Number of values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// Sum of values
    pub sum: f64,
}

impl StatisticalFeatures {
    /// Compute statistics from a slice of values
    ///
    /// An empty slice yields all zeros.
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let sum: f64 = values.iter().sum();
        let mean = sum / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
            sum,
        }
    }

    /// Span between the largest and smallest value
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_computation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.mean - 3.0).abs() < 0.001);
        assert!((stats.sum - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_population_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = StatisticalFeatures::compute(&values);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_range_ignores_order() {
        let stats = StatisticalFeatures::compute(&[5.0, 2.0, 9.0, 3.0]);
        assert_eq!(stats.range(), 7.0);
    }

    #[test]
    fn test_empty_values() {
        let stats = StatisticalFeatures::compute(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.range(), 0.0);
        assert_eq!(stats.sum, 0.0);
    }
}
