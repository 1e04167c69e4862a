//! File-backed batch iterator.
//!
//! [`RatingIter`] owns the whole rating list in memory and hands out
//! fixed-size [`Batch`]es by slicing it. A trailing group smaller than the
//! batch size is never yielded. Calling [`RatingIter::reset`] shuffles the
//! list in place, which is how a new epoch starts.

use crate::batch::{Batch, DataDesc, ITEM_FIELD, SCORE_FIELD, USER_FIELD};
use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{IdBounds, Rating};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::path::Path;
use tracing::{debug, instrument};

pub struct RatingIter {
    ratings: Vec<Rating>,
    batch_size: usize,
    rng: StdRng,
}

impl RatingIter {
    /// Wrap an in-memory list of ratings
    ///
    /// Fails with [`DataLoadError::InvalidBatchSize`] when `batch_size` is 0.
    pub fn new(ratings: Vec<Rating>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(DataLoadError::InvalidBatchSize);
        }
        Ok(Self {
            ratings,
            batch_size,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Load every rating of a tab-separated file
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn from_file(path: &Path, batch_size: usize) -> Result<Self> {
        let ratings = parser::parse_ratings(path)?;
        debug!("Loaded {} ratings", ratings.len());
        Self::new(ratings, batch_size)
    }

    /// Use a deterministic shuffle order (builder pattern)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    /// Restart the shuffle sequence from `seed`
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Shuffle the ratings in place so the next pass sees a new order
    pub fn reset(&mut self) {
        self.ratings.shuffle(&mut self.rng);
    }

    /// Lazily yield every full batch in the current order
    pub fn batches(&self) -> impl Iterator<Item = Batch> + '_ {
        self.ratings
            .chunks_exact(self.batch_size)
            .map(Batch::from_ratings)
    }

    /// Number of full batches per pass
    pub fn num_batches(&self) -> usize {
        self.ratings.len() / self.batch_size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Embedding sizes needed to cover the loaded ratings
    pub fn bounds(&self) -> IdBounds {
        IdBounds::from_ratings(&self.ratings)
    }

    /// Shapes of the input fields of every yielded batch
    pub fn provide_data(&self) -> Vec<DataDesc> {
        vec![
            DataDesc::new(USER_FIELD, vec![self.batch_size]),
            DataDesc::new(ITEM_FIELD, vec![self.batch_size]),
        ]
    }

    /// Shapes of the label fields of every yielded batch
    pub fn provide_label(&self) -> Vec<DataDesc> {
        vec![DataDesc::new(SCORE_FIELD, vec![self.batch_size])]
    }
}
