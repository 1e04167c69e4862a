//! Stochastic gradient descent with momentum and weight decay.
//!
//! Update rule for every parameter `w` with gradient `g`:
//!
//! ```text
//! v = momentum * v - lr * (g + wd * w)
//! w = w + v
//! ```

use candle_core::backprop::GradStore;
use candle_core::{Result, Var};
use candle_nn::Optimizer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamsMomentumSgd {
    pub lr: f64,
    pub momentum: f64,
    pub weight_decay: f64,
}

impl Default for ParamsMomentumSgd {
    fn default() -> Self {
        Self {
            lr: 0.05,
            momentum: 0.9,
            weight_decay: 1e-4,
        }
    }
}

struct VarMomentum {
    var: Var,
    velocity: Var,
}

pub struct MomentumSgd {
    vars: Vec<VarMomentum>,
    params: ParamsMomentumSgd,
}

impl Optimizer for MomentumSgd {
    type Config = ParamsMomentumSgd;

    fn new(vars: Vec<Var>, params: ParamsMomentumSgd) -> Result<Self> {
        let vars = vars
            .into_iter()
            .filter(|var| var.dtype().is_float())
            .map(|var| {
                let velocity = Var::zeros(var.shape(), var.dtype(), var.device())?;
                Ok(VarMomentum { var, velocity })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { vars, params })
    }

    fn learning_rate(&self) -> f64 {
        self.params.lr
    }

    fn set_learning_rate(&mut self, lr: f64) {
        self.params.lr = lr
    }

    fn step(&mut self, grads: &GradStore) -> Result<()> {
        let ParamsMomentumSgd {
            lr,
            momentum,
            weight_decay,
        } = self.params;

        for state in self.vars.iter() {
            let Some(grad) = grads.get(&state.var) else {
                continue;
            };
            let grad = if weight_decay != 0.0 {
                (grad + (state.var.as_tensor() * weight_decay)?)?
            } else {
                grad.clone()
            };
            let next_velocity = ((state.velocity.as_tensor() * momentum)? - (grad * lr)?)?;
            let next_value = (state.var.as_tensor() + &next_velocity)?;
            state.velocity.set(&next_velocity)?;
            state.var.set(&next_value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{Device, Tensor};

    fn assert_close(actual: Vec<f32>, expected: &[f32]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_momentum_update_rule() -> Result<()> {
        let w = Var::new(&[1.0f32, -2.0], &Device::Cpu)?;
        let params = ParamsMomentumSgd {
            lr: 0.1,
            momentum: 0.5,
            weight_decay: 0.0,
        };
        let mut opt = MomentumSgd::new(vec![w.clone()], params)?;

        // loss = sum(w^2) -> grad = 2w
        let loss = w.as_tensor().sqr()?.sum_all()?;
        opt.backward_step(&loss)?;
        // v = -0.1 * [2, -4] = [-0.2, 0.4]; w = [0.8, -1.6]
        assert_close(w.as_tensor().to_vec1::<f32>()?, &[0.8, -1.6]);

        let loss = w.as_tensor().sqr()?.sum_all()?;
        opt.backward_step(&loss)?;
        // v = 0.5 * [-0.2, 0.4] - 0.1 * [1.6, -3.2] = [-0.26, 0.52]
        assert_close(w.as_tensor().to_vec1::<f32>()?, &[0.54, -1.08]);
        Ok(())
    }

    #[test]
    fn test_weight_decay_shrinks_without_gradient_signal() -> Result<()> {
        let w = Var::new(&[2.0f32], &Device::Cpu)?;
        let params = ParamsMomentumSgd {
            lr: 0.5,
            momentum: 0.0,
            weight_decay: 0.1,
        };
        let mut opt = MomentumSgd::new(vec![w.clone()], params)?;

        // A loss whose gradient w.r.t. w is zero
        let loss = (w.as_tensor() * 0.0)?.sum_all()?;
        opt.backward_step(&loss)?;
        // w = 2 - 0.5 * 0.1 * 2
        assert_close(w.as_tensor().to_vec1::<f32>()?, &[1.9]);
        Ok(())
    }

    #[test]
    fn test_learning_rate_accessors() -> Result<()> {
        let w = Var::new(&[0.0f32], &Device::Cpu)?;
        let mut opt = MomentumSgd::new(vec![w], ParamsMomentumSgd::default())?;
        assert_eq!(opt.learning_rate(), 0.05);
        opt.set_learning_rate(0.01);
        assert_eq!(opt.learning_rate(), 0.01);

        let unused = Tensor::new(&[1.0f32], &Device::Cpu)?.sum_all()?;
        opt.backward_step(&unused)?;
        Ok(())
    }
}
