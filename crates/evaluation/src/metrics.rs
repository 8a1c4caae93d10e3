//! Regression Metrics

use crate::EvaluationError;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Regression error summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root mean squared error
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    /// Coefficient of determination
    #[serde(rename = "R2")]
    pub r2: f64,
    /// Mean squared error
    #[serde(rename = "MSE")]
    pub mse: f64,
    /// Mean absolute error
    #[serde(rename = "MAE")]
    pub mae: f64,
}

/// Score predictions against true targets
///
/// R2 is `1 - SS_res / SS_tot`; with constant targets it is 1.0 for a perfect
/// fit and 0.0 otherwise, and it is NaN for a single sample.
pub fn evaluate(
    y_true: ArrayView1<f64>,
    y_pred: ArrayView1<f64>,
) -> Result<RegressionMetrics, EvaluationError> {
    if y_true.len() != y_pred.len() {
        return Err(EvaluationError::LengthMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(EvaluationError::Empty);
    }

    let n = y_true.len() as f64;
    let residuals = &y_pred - &y_true;

    let ss_res: f64 = residuals.iter().map(|r| r * r).sum();
    let mse = ss_res / n;
    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n;

    let mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean) * (y - mean)).sum();

    let r2 = if y_true.len() < 2 {
        f64::NAN
    } else if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    let metrics = RegressionMetrics {
        rmse: mse.sqrt(),
        r2,
        mse,
        mae,
    };
    info!(
        "RMSE: {:.4}, R2 Score: {:.4}, MSE: {:.4}, MAE: {:.4}",
        metrics.rmse, metrics.r2, metrics.mse, metrics.mae
    );
    Ok(metrics)
}
