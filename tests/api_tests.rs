use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;

use reelrate_api::api::{create_router, AppState};
use reelrate_api::config::Config;
use reelrate_api::store::MemoryStore;

const REFERENCE_EMAIL: &str = "the-eye@example.com";

fn create_test_server() -> TestServer {
    let config = Config {
        database_url: None,
        jwt_secret: "test-secret".to_string(),
        reference_email: REFERENCE_EMAIL.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let state = AppState::new(Arc::new(MemoryStore::default()), config);
    TestServer::new(create_router(state)).unwrap()
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

async fn register_and_login(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/users")
        .json(&json!({ "email": email, "password": "hunter2" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let response = server
        .post("/login")
        .json(&json!({ "email": email, "password": "hunter2" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["token"].as_str().unwrap().to_string()
}

async fn create_movie(server: &TestServer, title: &str) -> String {
    let response = server.post("/movies").json(&json!({ "title": title })).await;
    response.assert_status(StatusCode::CREATED);
    let movie: serde_json::Value = response.json();
    movie["id"].as_str().unwrap().to_string()
}

async fn rate(server: &TestServer, token: &str, movie_id: &str, score: f64) {
    let (name, value) = bearer(token);
    let response = server
        .put(&format!("/movies/{movie_id}/rating"))
        .add_header(name, value)
        .json(&json!({ "score": score }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_register_hides_password_and_rejects_duplicates() {
    let server = create_test_server();

    let response = server
        .post("/users")
        .json(&json!({ "email": "ada@example.com", "password": "hunter2", "age": 36 }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["email"], "ada@example.com");
    assert_eq!(created["age"], 36);
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    // Same email again
    let response = server
        .post("/users")
        .json(&json!({ "email": "ada@example.com", "password": "other" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let server = create_test_server();
    let response = server
        .post("/users")
        .json(&json!({ "email": "not-an-email", "password": "hunter2" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let server = create_test_server();
    register_and_login(&server, "ada@example.com").await;

    let response = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/login")
        .json(&json!({ "email": "nobody@example.com", "password": "hunter2" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_movies_are_listed_by_title() {
    let server = create_test_server();
    create_movie(&server, "Vertigo").await;
    create_movie(&server, "Alien").await;

    let response = server.get("/movies").await;
    response.assert_status_ok();
    let movies: Vec<serde_json::Value> = response.json();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0]["title"], "Alien");
    assert_eq!(movies[1]["title"], "Vertigo");
}

#[tokio::test]
async fn test_rating_requires_authentication() {
    let server = create_test_server();
    let movie_id = create_movie(&server, "Alien").await;

    let response = server
        .put(&format!("/movies/{movie_id}/rating"))
        .json(&json!({ "score": 5.0 }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rating_rejects_out_of_range_scores() {
    let server = create_test_server();
    let token = register_and_login(&server, "ada@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;

    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/movies/{movie_id}/rating"))
        .add_header(name, value)
        .json(&json!({ "score": 7.5 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rating_unknown_movie_is_not_found() {
    let server = create_test_server();
    let token = register_and_login(&server, "ada@example.com").await;

    let (name, value) = bearer(&token);
    let response = server
        .put("/movies/6f9619ff-8b86-d011-b42d-00c04fc964ff/rating")
        .add_header(name, value)
        .json(&json!({ "score": 3.0 }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_resubmission_updates_in_place() {
    let server = create_test_server();
    let token = register_and_login(&server, "ada@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;

    rate(&server, &token, &movie_id, 2.0).await;
    rate(&server, &token, &movie_id, 5.0).await;

    // A single rating of 5.0, not two ratings averaging 3.5
    let response = server.get(&format!("/movies/{movie_id}")).await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["average_rating"], 5.0);
}

#[tokio::test]
async fn test_unrated_movie_has_no_average() {
    let server = create_test_server();
    let movie_id = create_movie(&server, "Alien").await;

    let response = server.get(&format!("/movies/{movie_id}")).await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["title"], "Alien");
    assert!(detail.get("average_rating").is_none());
    assert!(detail.get("verdict").is_none());
}

#[tokio::test]
async fn test_average_over_two_raters() {
    let server = create_test_server();
    let ada = register_and_login(&server, "ada@example.com").await;
    let ben = register_and_login(&server, "ben@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;

    rate(&server, &ada, &movie_id, 3.0).await;
    rate(&server, &ben, &movie_id, 5.0).await;

    let response = server.get(&format!("/movies/{movie_id}")).await;
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["average_rating"], 4.0);
}

#[tokio::test]
async fn test_user_detail_includes_rating_history() {
    let server = create_test_server();
    let token = register_and_login(&server, "ada@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;
    rate(&server, &token, &movie_id, 4.0).await;

    let response = server
        .post("/login")
        .json(&json!({ "email": "ada@example.com", "password": "hunter2" }))
        .await;
    let user_id = response.json::<serde_json::Value>()["user_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server.get(&format!("/users/{user_id}")).await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["email"], "ada@example.com");
    let ratings = detail["ratings"].as_array().unwrap();
    assert_eq!(ratings.len(), 1);
    assert_eq!(ratings[0]["score"], 4.0);
}

#[tokio::test]
async fn test_prediction_from_sole_correlated_neighbor() {
    // U1 rated M1=5, M2=3; U2 rated M1=4, M2=2 and M3=5. Viewing M3 as
    // U1 predicts exactly U2's score.
    let server = create_test_server();
    let u1 = register_and_login(&server, "u1@example.com").await;
    let u2 = register_and_login(&server, "u2@example.com").await;

    let m1 = create_movie(&server, "Movie One").await;
    let m2 = create_movie(&server, "Movie Two").await;
    let m3 = create_movie(&server, "Movie Three").await;

    rate(&server, &u1, &m1, 5.0).await;
    rate(&server, &u1, &m2, 3.0).await;
    rate(&server, &u2, &m1, 4.0).await;
    rate(&server, &u2, &m2, 2.0).await;
    rate(&server, &u2, &m3, 5.0).await;

    let (name, value) = bearer(&u1);
    let response = server
        .get(&format!("/movies/{m3}"))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert!(detail.get("user_rating").is_none());
    assert_eq!(detail["predicted_rating"], 5.0);
    // No reference user registered, so no verdict either
    assert!(detail.get("verdict").is_none());
}

#[tokio::test]
async fn test_anonymous_viewer_gets_no_prediction() {
    let server = create_test_server();
    let u1 = register_and_login(&server, "u1@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;
    rate(&server, &u1, &movie_id, 4.0).await;

    let response = server.get(&format!("/movies/{movie_id}")).await;
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["average_rating"], 4.0);
    assert!(detail.get("predicted_rating").is_none());
    assert!(detail.get("user_rating").is_none());
}

#[tokio::test]
async fn test_verdict_against_reference_user() {
    let server = create_test_server();
    let eye = register_and_login(&server, REFERENCE_EMAIL).await;
    let ada = register_and_login(&server, "ada@example.com").await;
    let movie_id = create_movie(&server, "Alien").await;

    rate(&server, &eye, &movie_id, 4.0).await;
    rate(&server, &ada, &movie_id, 4.0).await;

    let (name, value) = bearer(&ada);
    let response = server
        .get(&format!("/movies/{movie_id}"))
        .add_header(name, value)
        .await;
    response.assert_status_ok();
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["user_rating"], 4.0);
    // Matching scores still earn the mildest verdict
    let verdict = detail["verdict"].as_str().unwrap();
    assert!(verdict.contains("Agreeable"));
}

#[tokio::test]
async fn test_reference_user_sees_no_verdict_on_themselves() {
    let server = create_test_server();
    let eye = register_and_login(&server, REFERENCE_EMAIL).await;
    let movie_id = create_movie(&server, "Alien").await;
    rate(&server, &eye, &movie_id, 4.0).await;

    let (name, value) = bearer(&eye);
    let response = server
        .get(&format!("/movies/{movie_id}"))
        .add_header(name, value)
        .await;
    let detail: serde_json::Value = response.json();
    assert_eq!(detail["user_rating"], 4.0);
    assert!(detail.get("verdict").is_none());
}
