pub mod aggregation;
pub mod judgement;
pub mod prediction;
pub mod similarity;

pub use aggregation::{average_rating, AggregationError};
pub use judgement::judge;
pub use prediction::{NeighborRating, PredictionError, Predictor};
pub use similarity::{pearson, SimilarityError};

/// Rounds a score to one decimal place for display, matching the
/// precision of submitted ratings.
pub fn round_to_tenth(score: f64) -> f64 {
    (score * 10.0).round() / 10.0
}
