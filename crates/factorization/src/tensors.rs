//! Conversion of batches into device tensors.
//!
//! This is the point where ids are checked against the embedding sizes: an
//! out-of-range id is reported as [`FactorizationError::IdOutOfRange`]
//! instead of reaching the lookup.

use crate::error::{FactorizationError, Result};
use candle_core::{Device, Tensor};
use data_loader::{Batch, IdBounds, ItemId, UserId};

/// The `user`, `item` and `score` fields of a batch as tensors
#[derive(Debug, Clone)]
pub struct BatchTensors {
    pub users: Tensor,
    pub items: Tensor,
    pub scores: Tensor,
}

impl BatchTensors {
    pub fn new(batch: &Batch, bounds: IdBounds, device: &Device) -> Result<Self> {
        let (users, items) = id_tensors(&batch.users, &batch.items, bounds, device)?;
        let scores = Tensor::from_slice(&batch.scores, batch.scores.len(), device)?;
        Ok(Self {
            users,
            items,
            scores,
        })
    }
}

/// Bounds-checked `u32` id tensors of shape `(n,)`
pub fn id_tensors(
    users: &[UserId],
    items: &[ItemId],
    bounds: IdBounds,
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    if users.len() != items.len() {
        return Err(FactorizationError::InvalidConfig(format!(
            "{} user ids but {} item ids",
            users.len(),
            items.len()
        )));
    }
    if let Some(&id) = users.iter().find(|&&id| !bounds.contains_user(id)) {
        return Err(FactorizationError::IdOutOfRange {
            field: "user",
            id,
            bound: bounds.num_users,
        });
    }
    if let Some(&id) = items.iter().find(|&&id| !bounds.contains_item(id)) {
        return Err(FactorizationError::IdOutOfRange {
            field: "item",
            id,
            bound: bounds.num_items,
        });
    }

    let users = Tensor::from_slice(users, users.len(), device)?;
    let items = Tensor::from_slice(items, items.len(), device)?;
    Ok((users, items))
}
