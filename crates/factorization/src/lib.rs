//! Matrix-factorization rating prediction on top of candle.
//!
//! This crate provides:
//! - The RMSE metric used to score predictions
//! - Three networks: plain embedding dot product, one-layer MLP, and
//!   one-layer MLP with dropout
//! - Xavier initialisation and SGD with momentum
//! - A `Trainer` that runs the epoch loop and logs speed and metrics
//!
//! ## Architecture
//! 1. `data_loader` yields shuffled `Batch`es of `(user, item, score)`
//! 2. `BatchTensors` checks ids against the embedding sizes and moves the
//!    batch to the device
//! 3. A `RatingModel` predicts scores, the trainer applies the loss and
//!    updates parameters
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::{ensure_movielens, load_split};
//! use factorization::{NetworkKind, TrainConfig, Trainer};
//!
//! let paths = ensure_movielens("data".as_ref())?;
//! let mut split = load_split(&paths, 64)?;
//!
//! let trainer = Trainer::new(TrainConfig::new(NetworkKind::plain(64)))?;
//! let model = trainer.build_model(split.bounds)?;
//! let report = trainer.fit(&model, &mut split.train, Some(&split.test))?;
//! println!("validation rmse: {:?}", report.final_eval_rmse());
//! ```

pub mod config;
pub mod error;
pub mod init;
pub mod metric;
pub mod model;
pub mod networks;
pub mod optimizer;
pub mod tensors;
pub mod trainer;
pub mod traits;

// Re-export main types
pub use config::{DeviceConfig, TrainConfig};
pub use error::{FactorizationError, MetricError, Result};
pub use init::{FactorType, RandType, Xavier};
pub use metric::{Rmse, rmse};
pub use model::FactorizationModel;
pub use networks::{MlpNet, NetworkKind, PlainNet};
pub use optimizer::{MomentumSgd, ParamsMomentumSgd};
pub use tensors::BatchTensors;
pub use trainer::{EpochReport, Speedometer, TrainReport, Trainer};
pub use traits::RatingModel;
