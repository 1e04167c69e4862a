//! Core domain types for rating data.
//!
//! A rating file is a flat list of `(user, item, score)` triples. The types
//! here keep that shape: [`Rating`] is one record, [`IdBounds`] describes the
//! embedding table sizes needed to cover every id seen in a file.

use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up user IDs with item IDs

/// Identifier of a user (1-943 in MovieLens 100k)
pub type UserId = u32;

/// Identifier of a rated item (1-1682 in MovieLens 100k)
pub type ItemId = u32;

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating from a user for an item
///
/// The timestamp column of the source file is not kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    /// Rating value, 1.0 to 5.0 for MovieLens
    pub score: f32,
}

impl Rating {
    pub fn new(user_id: UserId, item_id: ItemId, score: f32) -> Self {
        Self {
            user_id,
            item_id,
            score,
        }
    }
}

// =============================================================================
// Id bounds
// =============================================================================

/// Number of rows needed in the user and item embedding tables.
///
/// Both values are `max id + 1`, so an id is valid when it is strictly
/// smaller than its bound. Id 0 is never used by MovieLens but stays
/// addressable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdBounds {
    pub num_users: usize,
    pub num_items: usize,
}

impl IdBounds {
    pub fn new(num_users: usize, num_items: usize) -> Self {
        Self {
            num_users,
            num_items,
        }
    }

    /// Smallest bounds covering every rating in `ratings`
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        ratings.iter().fold(Self::default(), |acc, r| acc.including(r))
    }

    /// Grow the bounds so they also cover `rating`
    pub fn including(self, rating: &Rating) -> Self {
        Self {
            num_users: self.num_users.max(rating.user_id as usize + 1),
            num_items: self.num_items.max(rating.item_id as usize + 1),
        }
    }

    /// Element-wise maximum of two bounds
    pub fn union(self, other: Self) -> Self {
        Self {
            num_users: self.num_users.max(other.num_users),
            num_items: self.num_items.max(other.num_items),
        }
    }

    pub fn contains_user(&self, id: UserId) -> bool {
        (id as usize) < self.num_users
    }

    pub fn contains_item(&self, id: ItemId) -> bool {
        (id as usize) < self.num_items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_ratings() {
        let ratings = vec![
            Rating::new(3, 10, 4.0),
            Rating::new(7, 2, 1.0),
            Rating::new(1, 5, 3.0),
        ];
        let bounds = IdBounds::from_ratings(&ratings);
        assert_eq!(bounds, IdBounds::new(8, 11));
        assert!(bounds.contains_user(7));
        assert!(!bounds.contains_user(8));
        assert!(bounds.contains_item(10));
        assert!(!bounds.contains_item(11));
    }

    #[test]
    fn test_empty_bounds() {
        let bounds = IdBounds::from_ratings(&[]);
        assert_eq!(bounds, IdBounds::new(0, 0));
        assert!(!bounds.contains_user(0));
    }

    #[test]
    fn test_union() {
        let a = IdBounds::new(10, 2);
        let b = IdBounds::new(3, 20);
        assert_eq!(a.union(b), IdBounds::new(10, 20));
    }
}
