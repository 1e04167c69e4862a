//! One hidden layer on each side before the dot product:
//! `embed -> relu -> linear(hidden) [-> dropout]`.

use super::{embedding, linear};
use crate::init::Xavier;
use crate::traits::RatingModel;
use candle_core::{Result, Tensor};
use candle_nn::{Dropout, Embedding, Linear, Module, ModuleT, VarBuilder};
use data_loader::IdBounds;

/// The per-side stack shared by users and items
struct Tower {
    embed: Embedding,
    fc: Linear,
    dropout: Option<Dropout>,
}

impl Tower {
    fn new(
        vb: VarBuilder,
        rows: usize,
        hidden: usize,
        k: usize,
        dropout: Option<f32>,
        xavier: &Xavier,
    ) -> Result<Self> {
        Ok(Self {
            embed: embedding(vb.pp("embed"), rows, k, xavier)?,
            fc: linear(vb.pp("fc"), k, hidden, xavier)?,
            dropout: dropout.map(Dropout::new),
        })
    }

    fn forward_t(&self, ids: &Tensor, train: bool) -> Result<Tensor> {
        let xs = self.embed.forward(ids)?.relu()?;
        let xs = self.fc.forward(&xs)?;
        match &self.dropout {
            Some(dropout) => dropout.forward_t(&xs, train),
            None => Ok(xs),
        }
    }
}

pub struct MlpNet {
    user: Tower,
    item: Tower,
    name: &'static str,
}

impl MlpNet {
    /// `dropout` is the drop probability; `None` builds the plain MLP.
    ///
    /// Parameters are registered under `user.*` and `item.*`.
    pub fn new(
        vb: VarBuilder,
        bounds: IdBounds,
        hidden: usize,
        k: usize,
        dropout: Option<f32>,
        xavier: &Xavier,
    ) -> Result<Self> {
        Ok(Self {
            user: Tower::new(vb.pp("user"), bounds.num_users, hidden, k, dropout, xavier)?,
            item: Tower::new(vb.pp("item"), bounds.num_items, hidden, k, dropout, xavier)?,
            name: if dropout.is_some() { "dropout_mlp" } else { "mlp" },
        })
    }
}

impl RatingModel for MlpNet {
    fn name(&self) -> &str {
        self.name
    }

    fn forward_t(&self, users: &Tensor, items: &Tensor, train: bool) -> Result<Tensor> {
        // (batch, hidden) each
        let user = self.user.forward_t(users, train)?;
        let item = self.item.forward_t(items, train)?;
        (user * item)?.sum(1)
    }
}
