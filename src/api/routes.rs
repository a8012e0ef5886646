use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Users
        .route("/users", get(handlers::get_users))
        .route("/users", post(handlers::register))
        .route("/users/:user_id", get(handlers::get_user))
        .route("/login", post(handlers::login))
        // Movies
        .route("/movies", get(handlers::get_movies))
        .route("/movies", post(handlers::create_movie))
        .route("/movies/:movie_id", get(handlers::get_movie))
        // Ratings
        .route("/movies/:movie_id/rating", put(handlers::rate_movie))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
