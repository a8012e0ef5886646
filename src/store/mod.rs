use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Movie, Rating, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{create_pool, PgStore};

/// Storage abstraction over users, movies, and the rating history
///
/// The rating history upholds one invariant: at most one rating per
/// (user, movie) pair. `upsert_rating` must be atomic per pair so the
/// invariant holds under concurrent submissions. Likewise `create_user`
/// enforces email uniqueness atomically and reports a duplicate as
/// `AppError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: User) -> AppResult<User>;
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn create_movie(&self, movie: Movie) -> AppResult<Movie>;
    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>>;
    /// All movies, ordered by title
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;

    /// One user's full rating history
    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>>;
    /// Every rating a movie has received
    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>>;
    async fn find_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>>;
    /// Inserts the rating, or updates the score in place when the pair
    /// already exists
    async fn upsert_rating(&self, user_id: Uuid, movie_id: Uuid, score: f64) -> AppResult<Rating>;
}
