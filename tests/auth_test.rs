mod common;

use axum::http::{Method, StatusCode};
use bikeshop_api::entities::user;
use common::TestApp;
use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

fn credentials(username: &str, password: &str) -> serde_json::Value {
    json!({ "username": username, "password": password })
}

#[tokio::test]
async fn register_stores_an_argon2_hash_and_hides_it() {
    let app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/register",
            Some(credentials("  genna.serrano ", "tandem-bike-42")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["username"], "genna.serrano");
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let user_id: Uuid = body["data"]["user_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let stored = user::Entity::find_by_id(user_id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_hash.starts_with("$argon2"));
    assert!(!stored.password_hash.contains("tandem-bike-42"));
}

#[tokio::test]
async fn usernames_are_unique_ignoring_case_and_bounded() {
    let app = TestApp::new().await;
    let (status, _) = app
        .call(Method::POST, "/api/v1/register", Some(credentials("Kali", "fixie-gear-9")))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call(Method::POST, "/api/v1/register", Some(credentials("kALI", "another-pass")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(Method::POST, "/api/v1/register", Some(credentials("layla", "short")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(Method::POST, "/api/v1/register", Some(credentials("ab", "long-enough-pass")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_issues_a_token_for_the_registered_user() {
    let app = TestApp::new().await;
    let (_, body) = app
        .call(
            Method::POST,
            "/api/v1/register",
            Some(credentials("marcelene", "cruiser-bell-7")),
        )
        .await;
    let user_id = body["data"]["user_id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/v1/login",
            Some(credentials("Marcelene", "cruiser-bell-7")),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(
        body["data"]["expires_in"].as_u64().unwrap(),
        app.state.config.jwt_expiration_secs
    );

    let token = body["data"]["access_token"].as_str().unwrap();
    let claims = app.state.services.auth.tokens().validate(token).unwrap();
    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.username, "marcelene");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    app.call(
        Method::POST,
        "/api/v1/register",
        Some(credentials("virgie", "gravel-ride-5")),
    )
    .await;

    let (status, wrong_password) = app
        .call(Method::POST, "/api/v1/login", Some(credentials("virgie", "gravel-ride-6")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown_user) = app
        .call(Method::POST, "/api/v1/login", Some(credentials("nobody", "gravel-ride-5")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}
