use thiserror::Error;

/// Error types for rating aggregation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("movie has no ratings")]
    NoRatings,
}

/// Arithmetic mean of a movie's scores.
///
/// An unrated movie has no average; that is reported explicitly rather
/// than as 0.0, which would read as a (terrible) real score.
pub fn average_rating(scores: &[f64]) -> Result<f64, AggregationError> {
    if scores.is_empty() {
        return Err(AggregationError::NoRatings);
    }
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_two_scores() {
        assert_eq!(average_rating(&[3.0, 5.0]), Ok(4.0));
    }

    #[test]
    fn test_single_score_is_its_own_mean() {
        assert_eq!(average_rating(&[2.0]), Ok(2.0));
    }

    #[test]
    fn test_no_ratings_is_explicit() {
        assert_eq!(average_rating(&[]), Err(AggregationError::NoRatings));
    }
}
