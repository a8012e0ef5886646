use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest score a rating may carry
pub const MIN_SCORE: f64 = 1.0;
/// Highest score a rating may carry
pub const MAX_SCORE: f64 = 5.0;

/// Returns whether a score lies on the rating scale.
///
/// Submissions outside the scale are rejected with 400; a stored score
/// outside the scale means the store itself is malformed and is treated
/// as a fatal, logged condition.
pub fn score_in_range(score: f64) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// A registered account
///
/// The password hash is never serialized; clients only ever see the
/// public profile fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

/// A movie that can be rated
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub released_at: Option<NaiveDate>,
}

/// One user's score for one movie
///
/// At most one rating exists per (user, movie) pair; resubmission
/// updates the score in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub score: f64,
}
