//! Regressor Ensemble

use crate::EvaluationError;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use tracing::debug;

/// Trained capacity regressor owned outside this workspace
pub trait Regressor {
    /// Predict one target per feature row
    fn predict(&self, features: ArrayView2<f64>) -> Result<Array1<f64>, EvaluationError>;
}

impl<F> Regressor for F
where
    F: Fn(ArrayView2<f64>) -> Result<Array1<f64>, EvaluationError>,
{
    fn predict(&self, features: ArrayView2<f64>) -> Result<Array1<f64>, EvaluationError> {
        self(features)
    }
}

/// Per-sample ensemble prediction
#[derive(Debug, Clone)]
pub struct EnsemblePrediction {
    /// Mean over members
    pub mean: Array1<f64>,
    /// Population standard deviation over members
    pub std: Array1<f64>,
}

/// Ordered set of regressors whose predictions are averaged
#[derive(Default)]
pub struct Ensemble {
    members: Vec<Box<dyn Regressor + Send + Sync>>,
}

impl Ensemble {
    /// Create an ensemble from members
    pub fn new(members: Vec<Box<dyn Regressor + Send + Sync>>) -> Self {
        Self { members }
    }

    /// Add a member
    pub fn push<R: Regressor + Send + Sync + 'static>(&mut self, member: R) {
        self.members.push(Box::new(member));
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether there are no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Predict with every member and aggregate per sample
    pub fn predict(&self, features: ArrayView2<f64>) -> Result<EnsemblePrediction, EvaluationError> {
        if self.members.is_empty() {
            return Err(EvaluationError::EmptyEnsemble);
        }

        let samples = features.nrows();
        let mut stacked = Array2::<f64>::zeros((self.members.len(), samples));
        for (i, member) in self.members.iter().enumerate() {
            let prediction = member.predict(features)?;
            if prediction.len() != samples {
                return Err(EvaluationError::LengthMismatch {
                    expected: samples,
                    actual: prediction.len(),
                });
            }
            stacked.row_mut(i).assign(&prediction);
        }

        debug!(
            "Ensemble of {} members predicted {} samples",
            self.members.len(),
            samples
        );

        let mean = stacked
            .mean_axis(Axis(0))
            .ok_or(EvaluationError::EmptyEnsemble)?;
        let std = stacked.std_axis(Axis(0), 0.0);
        Ok(EnsemblePrediction { mean, std })
    }
}
