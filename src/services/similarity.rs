use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

/// Why the similarity between two rating histories is undefined
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("users share no co-rated movies")]
    NoOverlap,
    #[error("one user's co-rated scores have zero variance")]
    DegenerateVariance,
}

/// Pearson correlation over the movies both users have rated.
///
/// Each history maps movie id to score. Zero is a meaningful similarity
/// (uncorrelated taste), so the undefined cases are reported as errors
/// rather than folded into 0.0: an empty co-rated set is `NoOverlap`,
/// and identical co-rated scores on either side is `DegenerateVariance`.
/// When defined the result lies in [-1, 1].
pub fn pearson(
    a: &HashMap<Uuid, f64>,
    b: &HashMap<Uuid, f64>,
) -> Result<f64, SimilarityError> {
    let paired: Vec<(f64, f64)> = a
        .iter()
        .filter_map(|(movie_id, &score_a)| b.get(movie_id).map(|&score_b| (score_a, score_b)))
        .collect();

    if paired.is_empty() {
        return Err(SimilarityError::NoOverlap);
    }

    let n = paired.len() as f64;
    let mean_a = paired.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = paired.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in &paired {
        let dx = x - mean_a;
        let dy = y - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    if variance_a == 0.0 || variance_b == 0.0 {
        return Err(SimilarityError::DegenerateVariance);
    }

    Ok(covariance / (variance_a.sqrt() * variance_b.sqrt()))
}
