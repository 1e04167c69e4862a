//! Xavier weight initialisation.
//!
//! For a 2-D weight of shape `(rows, cols)` the fan-in is `cols` and the
//! fan-out is `rows`. Values are drawn from `U(-s, s)` or `N(0, s)` with
//! `s = sqrt(magnitude / factor)`. Biases start at zero.

use candle_nn::Init;
use serde::{Deserialize, Serialize};

/// Which fan the scale is divided by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorType {
    In,
    Out,
    Avg,
}

/// Distribution the weights are sampled from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandType {
    Uniform,
    Gaussian,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xavier {
    pub rnd_type: RandType,
    pub factor_type: FactorType,
    pub magnitude: f64,
}

impl Xavier {
    pub fn new(rnd_type: RandType, factor_type: FactorType, magnitude: f64) -> Self {
        Self {
            rnd_type,
            factor_type,
            magnitude,
        }
    }

    /// Scale `s` for a weight of shape `(rows, cols)`
    pub fn scale(&self, rows: usize, cols: usize) -> f64 {
        let fan_in = cols as f64;
        let fan_out = rows as f64;
        let factor = match self.factor_type {
            FactorType::In => fan_in,
            FactorType::Out => fan_out,
            FactorType::Avg => (fan_in + fan_out) / 2.0,
        };
        (self.magnitude / factor.max(1.0)).sqrt()
    }

    /// Initialiser for a weight of shape `(rows, cols)`
    pub fn weight_init(&self, rows: usize, cols: usize) -> Init {
        let scale = self.scale(rows, cols);
        match self.rnd_type {
            RandType::Uniform => Init::Uniform {
                lo: -scale,
                up: scale,
            },
            RandType::Gaussian => Init::Randn {
                mean: 0.0,
                stdev: scale,
            },
        }
    }

    pub fn bias_init(&self) -> Init {
        Init::Const(0.0)
    }
}

/// Uniform, fan-in based, magnitude 2.34
impl Default for Xavier {
    fn default() -> Self {
        Self::new(RandType::Uniform, FactorType::In, 2.34)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_by_factor() {
        let xavier = Xavier::new(RandType::Uniform, FactorType::In, 2.0);
        assert!((xavier.scale(100, 8) - 0.5).abs() < 1e-12);

        let xavier = Xavier::new(RandType::Uniform, FactorType::Out, 2.0);
        assert!((xavier.scale(8, 100) - 0.5).abs() < 1e-12);

        let xavier = Xavier::new(RandType::Uniform, FactorType::Avg, 3.0);
        assert!((xavier.scale(2, 4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weight_init_variants() {
        let uniform = Xavier::new(RandType::Uniform, FactorType::In, 4.0);
        match uniform.weight_init(10, 16) {
            Init::Uniform { lo, up } => {
                assert_eq!(lo, -0.5);
                assert_eq!(up, 0.5);
            }
            other => panic!("unexpected init: {other:?}"),
        }

        let gaussian = Xavier::new(RandType::Gaussian, FactorType::In, 4.0);
        assert!(matches!(
            gaussian.weight_init(10, 16),
            Init::Randn { stdev, .. } if stdev == 0.5
        ));
    }
}
