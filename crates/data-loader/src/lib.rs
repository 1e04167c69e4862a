//! # Data Loader Crate
//!
//! Loads tab-separated rating files (MovieLens 100k layout) and turns them
//! into fixed-size batches for training.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Rating, IdBounds)
//! - **parser**: Parse rating files, compute id bounds
//! - **batch**: The Batch container and its field descriptors
//! - **iter**: RatingIter, the shuffling batch iterator
//! - **dataset**: Download/unpack MovieLens 100k and load its train/test split
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{ensure_movielens, load_split};
//! use std::path::Path;
//!
//! let paths = ensure_movielens(Path::new("data"))?;
//! let mut split = load_split(&paths, 64)?;
//!
//! split.train.reset();
//! for batch in split.train.batches() {
//!     println!("{} ratings, first user {}", batch.len(), batch.users[0]);
//! }
//! ```

// Public modules
pub mod batch;
pub mod dataset;
pub mod error;
pub mod iter;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use batch::{Batch, DataDesc};
pub use dataset::{MovieLensPaths, RatingSplit, ensure_movielens, load_split};
pub use error::{DataLoadError, Result};
pub use iter::RatingIter;
pub use parser::{max_id, parse_ratings};
pub use types::{
    // Type aliases
    ItemId,
    UserId,
    // Core types
    IdBounds,
    Rating,
};
