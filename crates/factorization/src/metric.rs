//! Root-mean-square error.
//!
//! [`rmse`] scores a single pair of label/prediction slices. [`Rmse`]
//! accumulates squared errors across many batches and reports the RMSE over
//! every sample it has seen.

use crate::error::MetricError;

const RMSE: &str = "rmse";

/// Square root of the mean squared difference between `labels` and `preds`
///
/// Empty input and mismatched lengths are errors rather than NaN.
pub fn rmse(labels: &[f32], preds: &[f32]) -> Result<f64, MetricError> {
    let mut metric = Rmse::new();
    metric.update(labels, preds)?;
    metric.get().ok_or(MetricError::Empty { metric: RMSE })
}

/// Running RMSE over all samples passed to [`Rmse::update`]
#[derive(Debug, Clone, Default)]
pub struct Rmse {
    sum_squared: f64,
    count: usize,
}

impl Rmse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &'static str {
        RMSE
    }

    /// Add one batch of labels and predictions
    pub fn update(&mut self, labels: &[f32], preds: &[f32]) -> Result<(), MetricError> {
        if labels.len() != preds.len() {
            return Err(MetricError::LengthMismatch {
                labels: labels.len(),
                preds: preds.len(),
            });
        }
        self.sum_squared += labels
            .iter()
            .zip(preds)
            .map(|(&l, &p)| {
                let diff = l as f64 - p as f64;
                diff * diff
            })
            .sum::<f64>();
        self.count += labels.len();
        Ok(())
    }

    /// Current value, `None` until at least one sample was seen
    pub fn get(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some((self.sum_squared / self.count as f64).sqrt())
        }
    }

    /// Number of samples accumulated so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
