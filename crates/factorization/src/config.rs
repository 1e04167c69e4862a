//! Training configuration.
//!
//! Defaults: batch size 64, 10 epochs, learning rate 0.05, momentum 0.9,
//! weight decay 1e-4 and Xavier initialisation (uniform, fan-in,
//! magnitude 2.34). A config can be read from JSON; missing fields fall
//! back to these defaults.

use crate::error::{FactorizationError, Result};
use crate::init::Xavier;
use crate::networks::NetworkKind;
use crate::optimizer::ParamsMomentumSgd;
use candle_core::Device;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Samples between two speed reports when no explicit frequency is set
const SAMPLES_PER_LOG: usize = 20_000;

/// Where tensors live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceConfig {
    #[default]
    Cpu,
    /// CUDA device by ordinal
    Cuda(usize),
}

impl DeviceConfig {
    pub fn device(&self) -> Result<Device> {
        match *self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda(ordinal) => Ok(Device::new_cuda(ordinal)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub network: NetworkKind,
    pub batch_size: usize,
    pub num_epoch: usize,
    pub learning_rate: f64,
    pub momentum: f64,
    pub weight_decay: f64,
    pub initializer: Xavier,
    /// Batches between speed reports; `None` means every 20000 samples
    pub log_frequency: Option<usize>,
    /// Seed of the shuffle order
    pub seed: Option<u64>,
    pub device: DeviceConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            network: NetworkKind::default(),
            batch_size: 64,
            num_epoch: 10,
            learning_rate: 0.05,
            momentum: 0.9,
            weight_decay: 1e-4,
            initializer: Xavier::default(),
            log_frequency: None,
            seed: None,
            device: DeviceConfig::Cpu,
        }
    }
}

impl TrainConfig {
    pub fn new(network: NetworkKind) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Read a JSON config file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_network(mut self, network: NetworkKind) -> Self {
        self.network = network;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_num_epoch(mut self, num_epoch: usize) -> Self {
        self.num_epoch = num_epoch;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_log_frequency(mut self, batches: usize) -> Self {
        self.log_frequency = Some(batches);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Batches between two speed reports, never zero
    pub fn log_every(&self) -> usize {
        self.log_frequency
            .unwrap_or(SAMPLES_PER_LOG / self.batch_size.max(1))
            .max(1)
    }

    pub fn optimizer_params(&self) -> ParamsMomentumSgd {
        ParamsMomentumSgd {
            lr: self.learning_rate,
            momentum: self.momentum,
            weight_decay: self.weight_decay,
        }
    }

    /// Reject values the trainer cannot work with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(FactorizationError::InvalidConfig(msg));

        if self.batch_size == 0 {
            return invalid("batch_size must be greater than zero".to_string());
        }
        if self.num_epoch == 0 {
            return invalid("num_epoch must be greater than zero".to_string());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return invalid(format!("momentum must be in [0, 1), got {}", self.momentum));
        }
        if !(self.weight_decay >= 0.0 && self.weight_decay.is_finite()) {
            return invalid(format!("weight_decay must be non-negative, got {}", self.weight_decay));
        }
        if !(self.initializer.magnitude > 0.0) {
            return invalid(format!(
                "initializer magnitude must be positive, got {}",
                self.initializer.magnitude
            ));
        }
        match self.network {
            NetworkKind::Plain { k } if k == 0 => {
                invalid("k must be greater than zero".to_string())
            }
            NetworkKind::Mlp { hidden, k } | NetworkKind::DropoutMlp { hidden, k, .. }
                if hidden == 0 || k == 0 =>
            {
                invalid("hidden and k must be greater than zero".to_string())
            }
            NetworkKind::DropoutMlp { p, .. } if !(0.0..1.0).contains(&p) => {
                invalid(format!("dropout must be in [0, 1), got {}", p))
            }
            _ => Ok(()),
        }
    }
}
