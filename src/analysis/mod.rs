//! Listing analysis: normalization, grouping, estimation, and scoring.

pub mod estimator;
pub mod grouper;
pub mod normalizer;
pub mod scorer;

pub use estimator::{ComparableSalesEstimator, PriceEstimator};
pub use grouper::partition;
pub use scorer::{score_cross, score_synthetic, DealQuote};
