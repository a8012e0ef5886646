use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, Rating, User};

use super::Store;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    movies: HashMap<Uuid, Movie>,
    ratings: HashMap<(Uuid, Uuid), f64>,
}

/// In-memory store
///
/// Backs the test suite and deployments without a DATABASE_URL. The
/// single write lock serializes upserts, so the one-rating-per-pair
/// invariant holds without further coordination.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut tables = self.inner.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.inner.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let tables = self.inner.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn create_movie(&self, movie: Movie) -> AppResult<Movie> {
        let mut tables = self.inner.write().await;
        tables.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        Ok(self.inner.read().await.movies.get(&id).cloned())
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let tables = self.inner.read().await;
        let mut movies: Vec<Movie> = tables.movies.values().cloned().collect();
        movies.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(movies)
    }

    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let tables = self.inner.read().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|(&(user_id, movie_id), &score)| Rating {
                user_id,
                movie_id,
                score,
            })
            .collect())
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let tables = self.inner.read().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|((_, movie), _)| *movie == movie_id)
            .map(|(&(user_id, movie_id), &score)| Rating {
                user_id,
                movie_id,
                score,
            })
            .collect())
    }

    async fn find_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let tables = self.inner.read().await;
        Ok(tables
            .ratings
            .get(&(user_id, movie_id))
            .map(|&score| Rating {
                user_id,
                movie_id,
                score,
            }))
    }

    async fn upsert_rating(&self, user_id: Uuid, movie_id: Uuid, score: f64) -> AppResult<Rating> {
        let mut tables = self.inner.write().await;
        tables.ratings.insert((user_id, movie_id), score);
        Ok(Rating {
            user_id,
            movie_id,
            score,
        })
    }
}
