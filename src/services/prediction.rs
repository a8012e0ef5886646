use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use super::similarity::pearson;
use super::round_to_tenth;

/// Error types for the predictor
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictionError {
    #[error("no positively correlated neighbor has rated this movie")]
    NoNeighbors,
}

/// One other user who has rated the target movie
#[derive(Debug, Clone)]
pub struct NeighborRating {
    /// The neighbor's full rating history, movie id to score
    pub history: HashMap<Uuid, f64>,
    /// The neighbor's score for the target movie
    pub score: f64,
}

/// Similarity-weighted predictor for a movie the target user has not rated
///
/// Callers are expected to use the actual rating when one exists; the
/// predictor itself never checks for it.
pub struct Predictor<'a> {
    target_history: &'a HashMap<Uuid, f64>,
    neighbors: &'a [NeighborRating],
}

impl<'a> Predictor<'a> {
    /// Creates a predictor over the target's history and the other raters
    /// of the movie
    pub fn new(target_history: &'a HashMap<Uuid, f64>, neighbors: &'a [NeighborRating]) -> Self {
        Self {
            target_history,
            neighbors,
        }
    }

    /// Predicts the target user's score as the similarity-weighted mean of
    /// neighbor scores, rounded to one decimal place.
    ///
    /// Neighbors whose similarity to the target is undefined or non-positive
    /// carry no information for a weighted mean and are excluded. With no
    /// qualifying neighbor there is no prediction.
    pub fn predict(&self) -> Result<f64, PredictionError> {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for neighbor in self.neighbors {
            let similarity = match pearson(self.target_history, &neighbor.history) {
                Ok(s) if s > 0.0 => s,
                _ => continue,
            };
            weighted_sum += similarity * neighbor.score;
            weight_total += similarity;
        }

        if weight_total == 0.0 {
            return Err(PredictionError::NoNeighbors);
        }

        Ok(round_to_tenth(weighted_sum / weight_total))
    }
}
