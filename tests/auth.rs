mod common;

use common::{error_messages, spawn_app, PASSWORD};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_is_alive() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/check_health")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/api/nothing")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_routes_ignore_path_case() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/api/Auth/Register"))
        .json(&json!({ "userName": "alice", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .client
        .post(app.url("/API/Auth/Login"))
        .json(&json!({ "userName": "alice", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();

    let response = app
        .post("/api/Post", token)
        .json(&json!({ "content": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    for path in [
        "/api/Post?pageSize=5",
        "/api/Like/audioRecord",
        "/api/Friend/friends",
        "/api/AudioRecords",
    ] {
        let response = app.get(path, token).send().await.unwrap();
        assert!(response.status().is_success(), "{}", path);
    }
}

#[tokio::test]
async fn register_returns_created_user() {
    let app = spawn_app().await;
    let response = app.register("alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["userName"], "alice");
    assert!(body["id"].as_i64().is_some());

    let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
        .bind("alice")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(stored, PASSWORD);
    assert!(stored.starts_with("$argon2"));
}

#[tokio::test]
async fn registering_taken_username_is_rejected() {
    let app = spawn_app().await;
    app.register("alice", PASSWORD).await;
    assert_eq!(app.count("users").await, 1);

    let response = app.register("alice", "anotherpassword").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(response).await, vec!["User already exists"]);
    assert_eq!(app.count("users").await, 1);
}

#[tokio::test]
async fn register_validates_fields() {
    let app = spawn_app().await;
    let response = app.register("al", "123").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(response).await.len(), 2);

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&json!({ "userName": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.count("users").await, 0);
}

#[tokio::test]
async fn login_returns_token() {
    let app = spawn_app().await;
    app.register("alice", PASSWORD).await;
    let response = app.login("alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn many_registrations_can_all_log_in() {
    let app = spawn_app().await;
    for i in 0..20 {
        let username = format!("user{:02}", i);
        let response = app.register(&username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::CREATED, "{}", username);
        let response = app.login(&username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", username);
    }
    assert_eq!(app.count("users").await, 20);
}

#[tokio::test]
async fn login_with_bad_credentials_never_returns_token() {
    let app = spawn_app().await;
    app.register("alice", PASSWORD).await;

    let wrong_password = app.login("alice", "wrongpassword").await;
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password = error_messages(wrong_password).await;

    let unknown_user = app.login("mallory", PASSWORD).await;
    assert_eq!(unknown_user.status(), StatusCode::BAD_REQUEST);
    let unknown_user = error_messages(unknown_user).await;

    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/api/post")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .client
        .get(app.url("/api/post"))
        .header("Authorization", "Token abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/api/post", "not-a-jwt").send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let app = spawn_app().await;
    let (_, token) = app.signed_up("alice").await;
    for scheme in ["bearer", "BEARER", "Bearer"] {
        let response = app
            .client
            .get(app.url("/api/post"))
            .header("Authorization", format!("{} {}", scheme, token))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{}", scheme);
    }
}

#[tokio::test]
async fn token_of_deleted_user_cannot_create() {
    let app = spawn_app().await;
    let (id, token) = app.signed_up("alice").await;
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app
        .post("/api/post", &token)
        .json(&json!({ "content": "hello" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_messages(response).await,
        vec!["User not found, try to re-authenticate."]
    );
    assert_eq!(app.count("posts").await, 0);
}
