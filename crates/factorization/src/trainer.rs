//! The training loop.
//!
//! [`Trainer::fit`] runs the usual epoch loop on top of candle: reshuffle,
//! forward in training mode, half mean-squared-error loss, backward, one
//! [`MomentumSgd`] step per batch. Progress is reported through `tracing`:
//! a [`Speedometer`] line every `log_every` batches, then the train RMSE,
//! the epoch time and the validation RMSE at the end of each epoch.

use crate::config::TrainConfig;
use crate::error::Result;
use crate::metric::Rmse;
use crate::model::FactorizationModel;
use crate::optimizer::MomentumSgd;
use crate::tensors::BatchTensors;
use candle_core::{Device, Tensor};
use candle_nn::{Optimizer, loss};
use data_loader::{IdBounds, RatingIter};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Logs throughput every `frequent` batches
pub struct Speedometer {
    batch_size: usize,
    frequent: usize,
    tic: Instant,
}

impl Speedometer {
    pub fn new(batch_size: usize, frequent: usize) -> Self {
        Self {
            batch_size,
            frequent: frequent.max(1),
            tic: Instant::now(),
        }
    }

    /// Record that `nbatch` batches of `epoch` are done.
    ///
    /// Returns the speed in samples per second when a report was due.
    pub fn tick(&mut self, epoch: usize, nbatch: usize, metric: &Rmse) -> Option<f64> {
        if nbatch % self.frequent != 0 {
            return None;
        }
        let elapsed = self.tic.elapsed().as_secs_f64().max(f64::EPSILON);
        let speed = (self.frequent * self.batch_size) as f64 / elapsed;
        match metric.get() {
            Some(value) => info!(
                "Epoch[{}] Batch [{}]\tSpeed: {:.2} samples/sec\tTrain-{}={:.6}",
                epoch,
                nbatch,
                speed,
                metric.name(),
                value
            ),
            None => info!("Epoch[{}] Batch [{}]\tSpeed: {:.2} samples/sec", epoch, nbatch, speed),
        }
        self.tic = Instant::now();
        Some(speed)
    }
}

/// Metrics of one finished epoch
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub train_rmse: Option<f64>,
    pub eval_rmse: Option<f64>,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrainReport {
    pub epochs: Vec<EpochReport>,
}

impl TrainReport {
    pub fn final_train_rmse(&self) -> Option<f64> {
        self.epochs.last().and_then(|e| e.train_rmse)
    }

    pub fn final_eval_rmse(&self) -> Option<f64> {
        self.epochs.last().and_then(|e| e.eval_rmse)
    }
}

pub struct Trainer {
    config: TrainConfig,
    device: Device,
}

impl Trainer {
    /// Validate `config` and open its device
    pub fn new(config: TrainConfig) -> Result<Self> {
        config.validate()?;
        let device = config.device.device()?;
        Ok(Self { config, device })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Build the configured network sized for `bounds`
    pub fn build_model(&self, bounds: IdBounds) -> Result<FactorizationModel> {
        FactorizationModel::new(
            &self.config.network,
            bounds,
            &self.config.initializer,
            &self.device,
        )
    }

    /// Train `model` on `train`, evaluating on `eval` after every epoch
    #[instrument(skip_all, fields(network = model.name()))]
    pub fn fit(
        &self,
        model: &FactorizationModel,
        train: &mut RatingIter,
        eval: Option<&RatingIter>,
    ) -> Result<TrainReport> {
        if train.num_batches() == 0 {
            warn!(
                "{} training ratings do not fill a single batch of {}",
                train.len(),
                train.batch_size()
            );
        }
        if train.batch_size() != self.config.batch_size {
            warn!(
                "Iterator batch size {} differs from configured {}",
                train.batch_size(),
                self.config.batch_size
            );
        }

        if let Some(seed) = self.config.seed {
            train.set_seed(seed);
        }

        let mut optimizer = MomentumSgd::new(model.vars(), self.config.optimizer_params())?;
        let mut report = TrainReport::default();

        info!(
            "Training {} ({} parameters) for {} epochs on {} ratings",
            model.name(),
            model.num_parameters(),
            self.config.num_epoch,
            train.len()
        );

        for epoch in 0..self.config.num_epoch {
            let tic = Instant::now();
            train.reset();

            let mut metric = Rmse::new();
            let mut speedometer = Speedometer::new(train.batch_size(), self.config.log_every());

            for (nbatch, batch) in train.batches().enumerate() {
                let tensors = BatchTensors::new(&batch, model.bounds(), model.device())?;
                let preds = model.network().forward_t(&tensors.users, &tensors.items, true)?;
                let loss = regression_loss(&preds, &tensors.scores)?;
                optimizer.backward_step(&loss)?;

                metric.update(&batch.scores, &preds.to_vec1::<f32>()?)?;
                speedometer.tick(epoch, nbatch + 1, &metric);
            }

            let train_rmse = metric.get();
            if let Some(value) = train_rmse {
                info!("Epoch[{}] Train-{}={:.6}", epoch, metric.name(), value);
            }
            let elapsed = tic.elapsed();
            info!("Epoch[{}] Time cost={:.3}", epoch, elapsed.as_secs_f64());

            let eval_rmse = match eval {
                Some(eval) => model.evaluate(eval)?,
                None => None,
            };
            if let Some(value) = eval_rmse {
                info!("Epoch[{}] Validation-{}={:.6}", epoch, metric.name(), value);
            }

            report.epochs.push(EpochReport {
                epoch,
                train_rmse,
                eval_rmse,
                elapsed,
            });
        }

        Ok(report)
    }
}

/// Half mean squared error, whose gradient is `(pred - label) / batch`
pub fn regression_loss(preds: &Tensor, labels: &Tensor) -> candle_core::Result<Tensor> {
    loss::mse(preds, labels)? * 0.5
}
