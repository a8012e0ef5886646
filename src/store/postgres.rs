use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Movie, Rating, User};

use super::Store;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed store
///
/// The ratings table keys on (user_id, movie_id), and upserts go through
/// `ON CONFLICT .. DO UPDATE`, so the one-rating-per-pair invariant is
/// enforced by the database rather than a read-then-write sequence.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the schema when it does not exist yet
    pub async fn init_schema(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                age INT,
                zipcode TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS movies (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                released_at DATE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ratings (
                user_id UUID NOT NULL REFERENCES users(id),
                movie_id UUID NOT NULL REFERENCES movies(id),
                score DOUBLE PRECISION NOT NULL,
                PRIMARY KEY (user_id, movie_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: User) -> AppResult<User> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, age, zipcode) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.zipcode)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("email already registered".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, age, zipcode FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, age, zipcode FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, age, zipcode FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create_movie(&self, movie: Movie) -> AppResult<Movie> {
        sqlx::query("INSERT INTO movies (id, title, released_at) VALUES ($1, $2, $3)")
            .bind(movie.id)
            .bind(&movie.title)
            .bind(movie.released_at)
            .execute(&self.pool)
            .await?;

        Ok(movie)
    }

    async fn find_movie(&self, id: Uuid) -> AppResult<Option<Movie>> {
        let movie =
            sqlx::query_as::<_, Movie>("SELECT id, title, released_at FROM movies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(movie)
    }

    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies =
            sqlx::query_as::<_, Movie>("SELECT id, title, released_at FROM movies ORDER BY title")
                .fetch_all(&self.pool)
                .await?;

        Ok(movies)
    }

    async fn ratings_by_user(&self, user_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT user_id, movie_id, score FROM ratings WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn ratings_for_movie(&self, movie_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT user_id, movie_id, score FROM ratings WHERE movie_id = $1",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ratings)
    }

    async fn find_rating(&self, user_id: Uuid, movie_id: Uuid) -> AppResult<Option<Rating>> {
        let rating = sqlx::query_as::<_, Rating>(
            "SELECT user_id, movie_id, score FROM ratings WHERE user_id = $1 AND movie_id = $2",
        )
        .bind(user_id)
        .bind(movie_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rating)
    }

    async fn upsert_rating(&self, user_id: Uuid, movie_id: Uuid, score: f64) -> AppResult<Rating> {
        let rating = sqlx::query_as::<_, Rating>(
            "INSERT INTO ratings (user_id, movie_id, score) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, movie_id) DO UPDATE SET score = EXCLUDED.score \
             RETURNING user_id, movie_id, score",
        )
        .bind(user_id)
        .bind(movie_id)
        .bind(score)
        .fetch_one(&self.pool)
        .await?;

        Ok(rating)
    }
}
