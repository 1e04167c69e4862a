//! The seam between the trainer and the network definitions.

use candle_core::{Result, Tensor};

/// A network mapping `(user ids, item ids)` to predicted scores.
///
/// Implementations own their layers; parameters live in the `VarMap` the
/// layers were built from, so the optimizer can update them in place.
pub trait RatingModel: Send + Sync {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Predict one score per `(user, item)` pair.
    ///
    /// # Arguments
    /// * `users` - `u32` ids, shape `(batch,)`
    /// * `items` - `u32` ids, shape `(batch,)`
    /// * `train` - enables training-only layers such as dropout
    ///
    /// # Returns
    /// `f32` predictions of shape `(batch,)`
    fn forward_t(&self, users: &Tensor, items: &Tensor, train: bool) -> Result<Tensor>;
}
