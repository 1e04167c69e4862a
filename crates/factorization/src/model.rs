//! A built network together with its parameters and device.

use crate::error::Result;
use crate::init::Xavier;
use crate::metric::Rmse;
use crate::networks::NetworkKind;
use crate::tensors::{BatchTensors, id_tensors};
use crate::traits::RatingModel;
use candle_core::{DType, Device, Var};
use candle_nn::{VarBuilder, VarMap};
use data_loader::{Batch, IdBounds, ItemId, RatingIter, UserId};
use tracing::debug;

pub struct FactorizationModel {
    varmap: VarMap,
    network: Box<dyn RatingModel>,
    bounds: IdBounds,
    device: Device,
}

impl FactorizationModel {
    /// Build `kind` with freshly initialised `f32` parameters
    pub fn new(
        kind: &NetworkKind,
        bounds: IdBounds,
        xavier: &Xavier,
        device: &Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let network = kind.build(vb, bounds, xavier)?;
        debug!(
            "Built {} network with {} parameter tensors",
            network.name(),
            varmap.all_vars().len()
        );
        Ok(Self {
            varmap,
            network,
            bounds,
            device: device.clone(),
        })
    }

    pub fn name(&self) -> &str {
        self.network.name()
    }

    pub fn network(&self) -> &dyn RatingModel {
        self.network.as_ref()
    }

    pub fn bounds(&self) -> IdBounds {
        self.bounds
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Trainable parameters
    pub fn vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Total number of scalar parameters
    pub fn num_parameters(&self) -> usize {
        self.vars().iter().map(|v| v.elem_count()).sum()
    }

    /// Predict a score for every `(users[i], items[i])` pair in inference mode
    pub fn predict(&self, users: &[UserId], items: &[ItemId]) -> Result<Vec<f32>> {
        if users.is_empty() && items.is_empty() {
            return Ok(Vec::new());
        }
        let (users, items) = id_tensors(users, items, self.bounds, &self.device)?;
        let preds = self.network.forward_t(&users, &items, false)?;
        Ok(preds.to_vec1::<f32>()?)
    }

    pub fn predict_batch(&self, batch: &Batch) -> Result<Vec<f32>> {
        self.predict(&batch.users, &batch.items)
    }

    /// RMSE over every full batch of `iter`, `None` when it has no batch
    pub fn evaluate(&self, iter: &RatingIter) -> Result<Option<f64>> {
        let mut metric = Rmse::new();
        for batch in iter.batches() {
            let tensors = BatchTensors::new(&batch, self.bounds, &self.device)?;
            let preds = self
                .network
                .forward_t(&tensors.users, &tensors.items, false)?
                .to_vec1::<f32>()?;
            metric.update(&batch.scores, &preds)?;
        }
        Ok(metric.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactorizationError;
    use data_loader::Rating;

    fn model() -> FactorizationModel {
        FactorizationModel::new(
            &NetworkKind::plain(4),
            IdBounds::new(5, 7),
            &Xavier::default(),
            &Device::Cpu,
        )
        .unwrap()
    }

    #[test]
    fn test_parameter_count() {
        let model = model();
        assert_eq!(model.name(), "plain");
        assert_eq!(model.vars().len(), 2);
        assert_eq!(model.num_parameters(), (5 + 7) * 4);
    }

    #[test]
    fn test_predict_shapes_and_bounds() {
        let model = model();
        assert_eq!(model.predict(&[0, 4, 2], &[6, 0, 3]).unwrap().len(), 3);
        assert!(model.predict(&[], &[]).unwrap().is_empty());
        assert!(matches!(
            model.predict(&[5], &[0]),
            Err(FactorizationError::IdOutOfRange { field: "user", .. })
        ));
    }

    #[test]
    fn test_evaluate_without_batches() {
        let model = model();
        let iter = RatingIter::new(vec![Rating::new(1, 1, 3.0)], 4).unwrap();
        assert_eq!(model.evaluate(&iter).unwrap(), None);
    }

    #[test]
    fn test_evaluate_matches_predictions() {
        let model = model();
        let ratings = vec![
            Rating::new(1, 1, 3.0),
            Rating::new(2, 3, 4.0),
            Rating::new(4, 6, 1.0),
            Rating::new(0, 0, 5.0),
        ];
        let iter = RatingIter::new(ratings.clone(), 2).unwrap();

        let batch = Batch::from_ratings(&ratings);
        let preds = model.predict_batch(&batch).unwrap();
        let expected = crate::metric::rmse(&batch.scores, &preds).unwrap();

        let value = model.evaluate(&iter).unwrap().unwrap();
        assert!((value - expected).abs() < 1e-5);
    }
}
