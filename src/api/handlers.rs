use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::error::{AppError, AppResult};
use crate::models::{score_in_range, Movie, Rating, User, MAX_SCORE, MIN_SCORE};
use crate::services::{average_rating, judge, round_to_tenth, NeighborRating, Predictor};
use crate::store::Store;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub age: Option<i32>,
    pub zipcode: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            age: user.age,
            zipcode: user.zipcode.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub ratings: Vec<RatingResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub released_at: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub movie_id: Uuid,
    pub score: f64,
}

impl From<&Rating> for RatingResponse {
    fn from(rating: &Rating) -> Self {
        Self {
            movie_id: rating.movie_id,
            score: rating.score,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub score: f64,
}

/// Movie detail as shown to a viewer
///
/// Every score field is optional; sparse data means omission, never an
/// error. The verdict compares the viewer's effective score with the
/// reference user's and is absent whenever either side is unknown.
#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    if !request.email.contains('@') {
        return Err(AppError::InvalidInput("malformed email address".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::InvalidInput("password must not be empty".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        email: request.email,
        password_hash: auth::hash_password(&request.password),
        age: request.age,
        zipcode: request.zipcode,
    };

    let user = state.store.create_user(user).await?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Verify credentials and issue a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .store
        .find_user_by_email(&request.email)
        .await?
        .filter(|user| auth::verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| AppError::Unauthorized("incorrect email or password".to_string()))?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Get one user along with their rating history
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserDetailResponse>> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no user with id {user_id}")))?;

    let ratings = state.store.ratings_by_user(user_id).await?;

    Ok(Json(UserDetailResponse {
        user: UserResponse::from(&user),
        ratings: ratings.iter().map(RatingResponse::from).collect(),
    }))
}

/// Get all movies, ordered by title
pub async fn get_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    let movies = state.store.list_movies().await?;
    Ok(Json(movies))
}

/// Create a new movie
pub async fn create_movie(
    State(state): State<AppState>,
    Json(request): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    if request.title.trim().is_empty() {
        return Err(AppError::InvalidInput("title must not be empty".to_string()));
    }

    let movie = Movie {
        id: Uuid::new_v4(),
        title: request.title,
        released_at: request.released_at,
    };

    let movie = state.store.create_movie(movie).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Movie detail: the average rating, plus the viewer's own or predicted
/// rating and a judgement verdict when the caller is authenticated
pub async fn get_movie(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    Path(movie_id): Path<Uuid>,
) -> AppResult<Json<MovieDetailResponse>> {
    let movie = state
        .store
        .find_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no movie with id {movie_id}")))?;

    let ratings = state.store.ratings_for_movie(movie_id).await?;
    for rating in &ratings {
        if !score_in_range(rating.score) {
            tracing::error!(
                user_id = %rating.user_id,
                movie_id = %rating.movie_id,
                score = rating.score,
                "rating store holds an out-of-range score"
            );
            return Err(AppError::Internal("malformed rating store".to_string()));
        }
    }

    let scores: Vec<f64> = ratings.iter().map(|r| r.score).collect();
    let average = average_rating(&scores).ok().map(round_to_tenth);

    let store = state.store.as_ref();
    let (user_rating, predicted_rating, verdict) = match viewer {
        Some(AuthUser(viewer_id)) => {
            let (actual, predicted) = effective_parts(store, viewer_id, &ratings).await?;

            let reference_effective =
                reference_effective_score(store, &state.config.reference_email, viewer_id, &ratings)
                    .await?;
            let verdict =
                judge(actual.or(predicted), reference_effective).map(str::to_string);

            (actual, predicted, verdict)
        }
        None => (None, None, None),
    };

    Ok(Json(MovieDetailResponse {
        movie,
        average_rating: average,
        user_rating,
        predicted_rating,
        verdict,
    }))
}

/// Submit or revise the caller's rating for a movie
pub async fn rate_movie(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<Uuid>,
    Json(request): Json<RateRequest>,
) -> AppResult<Json<RatingResponse>> {
    if !score_in_range(request.score) {
        return Err(AppError::InvalidInput(format!(
            "score must lie between {MIN_SCORE} and {MAX_SCORE}"
        )));
    }

    state
        .store
        .find_movie(movie_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no movie with id {movie_id}")))?;

    let rating = state.store.upsert_rating(user_id, movie_id, request.score).await?;
    tracing::info!(%user_id, %movie_id, score = request.score, "rating stored");

    Ok(Json(RatingResponse::from(&rating)))
}

/// Resolves the two halves of a user's effective score for a movie: the
/// actual rating when present, otherwise a prediction from positively
/// correlated neighbors among the movie's raters.
async fn effective_parts(
    store: &dyn Store,
    user_id: Uuid,
    movie_ratings: &[Rating],
) -> AppResult<(Option<f64>, Option<f64>)> {
    if let Some(rating) = movie_ratings.iter().find(|r| r.user_id == user_id) {
        return Ok((Some(rating.score), None));
    }

    let target_history = history_of(store, user_id).await?;
    let mut neighbors = Vec::with_capacity(movie_ratings.len());
    for rating in movie_ratings {
        neighbors.push(NeighborRating {
            history: history_of(store, rating.user_id).await?,
            score: rating.score,
        });
    }

    let predicted = Predictor::new(&target_history, &neighbors).predict().ok();
    Ok((None, predicted))
}

/// The reference user's effective score for the movie, absent when no
/// reference user is registered. A viewer looking at their own account
/// as the reference gets no comparison.
async fn reference_effective_score(
    store: &dyn Store,
    reference_email: &str,
    viewer_id: Uuid,
    movie_ratings: &[Rating],
) -> AppResult<Option<f64>> {
    let reference = match store.find_user_by_email(reference_email).await? {
        Some(user) if user.id != viewer_id => user,
        _ => return Ok(None),
    };

    let (actual, predicted) = effective_parts(store, reference.id, movie_ratings).await?;
    Ok(actual.or(predicted))
}

/// One user's rating history as a movie-to-score map
async fn history_of(store: &dyn Store, user_id: Uuid) -> AppResult<HashMap<Uuid, f64>> {
    let ratings = store.ratings_by_user(user_id).await?;
    Ok(ratings.into_iter().map(|r| (r.movie_id, r.score)).collect())
}
