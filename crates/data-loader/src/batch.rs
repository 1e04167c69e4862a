//! The batch container handed to the trainer.
//!
//! A [`Batch`] stores a fixed number of ratings as three parallel columns.
//! The trainer looks fields up by name, so the names and shapes are exposed
//! through [`Batch::provide_data`] and [`Batch::provide_label`].

use crate::types::{ItemId, Rating, UserId};
use serde::Serialize;

/// Input field holding user ids
pub const USER_FIELD: &str = "user";
/// Input field holding item ids
pub const ITEM_FIELD: &str = "item";
/// Label field holding the observed scores
pub const SCORE_FIELD: &str = "score";

/// Name and shape of one field of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataDesc {
    pub name: &'static str,
    pub shape: Vec<usize>,
}

impl DataDesc {
    pub fn new(name: &'static str, shape: Vec<usize>) -> Self {
        Self { name, shape }
    }
}

/// A group of ratings split into parallel `users`, `items` and `scores` arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub users: Vec<UserId>,
    pub items: Vec<ItemId>,
    pub scores: Vec<f32>,
}

impl Batch {
    /// Split a slice of ratings into columns
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut users = Vec::with_capacity(ratings.len());
        let mut items = Vec::with_capacity(ratings.len());
        let mut scores = Vec::with_capacity(ratings.len());
        for r in ratings {
            users.push(r.user_id);
            items.push(r.item_id);
            scores.push(r.score);
        }
        Self {
            users,
            items,
            scores,
        }
    }

    /// Number of ratings in the batch
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn data_names(&self) -> [&'static str; 2] {
        [USER_FIELD, ITEM_FIELD]
    }

    pub fn label_names(&self) -> [&'static str; 1] {
        [SCORE_FIELD]
    }

    /// Shapes of the input fields, `[(user, [n]), (item, [n])]`
    pub fn provide_data(&self) -> Vec<DataDesc> {
        vec![
            DataDesc::new(USER_FIELD, vec![self.users.len()]),
            DataDesc::new(ITEM_FIELD, vec![self.items.len()]),
        ]
    }

    /// Shapes of the label fields, `[(score, [n])]`
    pub fn provide_label(&self) -> Vec<DataDesc> {
        vec![DataDesc::new(SCORE_FIELD, vec![self.scores.len()])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ratings() {
        let ratings = vec![Rating::new(1, 10, 4.0), Rating::new(2, 20, 3.5)];
        let batch = Batch::from_ratings(&ratings);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.users, vec![1, 2]);
        assert_eq!(batch.items, vec![10, 20]);
        assert_eq!(batch.scores, vec![4.0, 3.5]);
    }

    #[test]
    fn test_names_and_shapes() {
        let batch = Batch::from_ratings(&[Rating::new(1, 1, 1.0); 3]);

        assert_eq!(batch.data_names(), ["user", "item"]);
        assert_eq!(batch.label_names(), ["score"]);
        assert_eq!(
            batch.provide_data(),
            vec![DataDesc::new("user", vec![3]), DataDesc::new("item", vec![3])]
        );
        assert_eq!(batch.provide_label(), vec![DataDesc::new("score", vec![3])]);
    }
}
