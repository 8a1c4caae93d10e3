//! Per-Cycle Z-Score Normalization

use crate::statistics::StatisticalFeatures;

/// Outcome of normalizing one series
#[derive(Debug, Clone, PartialEq)]
pub enum ZScore {
    /// Centered and scaled to unit standard deviation
    Scaled(Vec<f64>),
    /// Standard deviation was zero; values are centered only (all zero)
    ZeroVariance(Vec<f64>),
}

impl ZScore {
    /// Normalize a series with its own mean and population standard deviation
    pub fn compute(values: &[f64]) -> Self {
        let stats = StatisticalFeatures::compute(values);
        let tolerance = f64::EPSILON * stats.mean.abs().max(1.0);

        if stats.std_dev <= tolerance {
            return ZScore::ZeroVariance(vec![0.0; values.len()]);
        }

        ZScore::Scaled(
            values
                .iter()
                .map(|v| (v - stats.mean) / stats.std_dev)
                .collect(),
        )
    }

    /// Whether the series had no spread
    pub fn is_degenerate(&self) -> bool {
        matches!(self, ZScore::ZeroVariance(_))
    }

    /// Normalized values
    pub fn into_values(self) -> Vec<f64> {
        match self {
            ZScore::Scaled(values) | ZScore::ZeroVariance(values) => values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zscore_normalization() {
        let result = ZScore::compute(&[1.0, 2.0, 3.0]);
        assert!(!result.is_degenerate());
        let values = result.into_values();
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        assert!((values[0] + expected).abs() < 1e-12);
        assert!(values[1].abs() < 1e-12);
        assert!((values[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_is_degenerate() {
        let result = ZScore::compute(&[0.042]);
        assert!(result.is_degenerate());
        assert_eq!(result.into_values(), vec![0.0]);
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let result = ZScore::compute(&[0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1]);
        assert!(result.is_degenerate());
        assert!(result.into_values().iter().all(|v| *v == 0.0 && v.is_finite()));
    }

    proptest! {
        #[test]
        fn prop_scaled_has_zero_mean_unit_std(
            values in proptest::collection::vec(-100.0f64..100.0, 2..64)
        ) {
            let distinct = values.iter().any(|v| (v - values[0]).abs() > 1e-3);
            prop_assume!(distinct);

            let scaled = ZScore::compute(&values).into_values();
            let stats = StatisticalFeatures::compute(&scaled);
            prop_assert!(stats.mean.abs() < 1e-9);
            prop_assert!((stats.std_dev - 1.0).abs() < 1e-9);
        }
    }
}
