//! Network definitions.
//!
//! Every network embeds users and items into vectors of the same width and
//! predicts the score as their inner product.

pub mod mlp;
pub mod plain;

pub use mlp::MlpNet;
pub use plain::PlainNet;

use crate::init::Xavier;
use crate::traits::RatingModel;
use candle_core::Result;
use candle_nn::{Embedding, Linear, VarBuilder};
use data_loader::IdBounds;
use serde::{Deserialize, Serialize};

/// Default dropout probability of [`NetworkKind::DropoutMlp`]
pub const DEFAULT_DROPOUT: f32 = 0.5;

/// Which network to train, with its sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkKind {
    /// Embedding dot product
    Plain { k: usize },
    /// `embed -> relu -> linear(hidden)` on both sides, then dot product
    Mlp { hidden: usize, k: usize },
    /// Same as `Mlp` with dropout after the linear layer
    DropoutMlp { hidden: usize, k: usize, p: f32 },
}

impl NetworkKind {
    pub fn plain(k: usize) -> Self {
        Self::Plain { k }
    }

    pub fn one_layer_mlp(hidden: usize, k: usize) -> Self {
        Self::Mlp { hidden, k }
    }

    pub fn one_layer_dropout_mlp(hidden: usize, k: usize) -> Self {
        Self::DropoutMlp {
            hidden,
            k,
            p: DEFAULT_DROPOUT,
        }
    }

    /// Build the layers, registering their parameters in `vb`
    pub fn build(
        &self,
        vb: VarBuilder,
        bounds: IdBounds,
        xavier: &Xavier,
    ) -> Result<Box<dyn RatingModel>> {
        let network: Box<dyn RatingModel> = match *self {
            Self::Plain { k } => Box::new(PlainNet::new(vb, bounds, k, xavier)?),
            Self::Mlp { hidden, k } => Box::new(MlpNet::new(vb, bounds, hidden, k, None, xavier)?),
            Self::DropoutMlp { hidden, k, p } => {
                Box::new(MlpNet::new(vb, bounds, hidden, k, Some(p), xavier)?)
            }
        };
        Ok(network)
    }
}

impl Default for NetworkKind {
    fn default() -> Self {
        Self::plain(64)
    }
}

/// Embedding table of shape `(rows, dim)`, stored as `<vb prefix>.weight`
pub(crate) fn embedding(
    vb: VarBuilder,
    rows: usize,
    dim: usize,
    xavier: &Xavier,
) -> Result<Embedding> {
    let weight = vb.get_with_hints((rows, dim), "weight", xavier.weight_init(rows, dim))?;
    Ok(Embedding::new(weight, dim))
}

/// Fully connected layer `in_dim -> out_dim` with a zero-initialised bias
pub(crate) fn linear(
    vb: VarBuilder,
    in_dim: usize,
    out_dim: usize,
    xavier: &Xavier,
) -> Result<Linear> {
    let init = xavier.weight_init(out_dim, in_dim);
    let weight = vb.get_with_hints((out_dim, in_dim), "weight", init)?;
    let bias = vb.get_with_hints(out_dim, "bias", xavier.bias_init())?;
    Ok(Linear::new(weight, Some(bias)))
}
