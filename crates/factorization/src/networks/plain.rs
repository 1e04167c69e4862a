//! Plain matrix factorization: the score is the dot product of the user and
//! item embeddings.

use super::embedding;
use crate::init::Xavier;
use crate::traits::RatingModel;
use candle_core::{Result, Tensor};
use candle_nn::{Embedding, Module, VarBuilder};
use data_loader::IdBounds;

pub struct PlainNet {
    user_embed: Embedding,
    item_embed: Embedding,
}

impl PlainNet {
    /// Parameters: `user_embed.weight (num_users, k)`, `item_embed.weight (num_items, k)`
    pub fn new(vb: VarBuilder, bounds: IdBounds, k: usize, xavier: &Xavier) -> Result<Self> {
        Ok(Self {
            user_embed: embedding(vb.pp("user_embed"), bounds.num_users, k, xavier)?,
            item_embed: embedding(vb.pp("item_embed"), bounds.num_items, k, xavier)?,
        })
    }
}

impl RatingModel for PlainNet {
    fn name(&self) -> &str {
        "plain"
    }

    fn forward_t(&self, users: &Tensor, items: &Tensor, _train: bool) -> Result<Tensor> {
        // (batch, k) each
        let user = self.user_embed.forward(users)?;
        let item = self.item_embed.forward(items)?;
        (user * item)?.sum(1)
    }
}
