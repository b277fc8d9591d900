mod common;

use common::{error_messages, spawn_app, TestApp};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

async fn send_message(app: &TestApp, token: &str, receiver_id: i64, content: &str) -> Response {
    app.post("/api/message", token)
        .json(&json!({ "content": content, "receiverId": receiver_id }))
        .send()
        .await
        .unwrap()
}

fn contents(body: &Value) -> Vec<&str> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["content"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn send_and_read_message() {
    let app = spawn_app().await;
    let (alice, alice_token) = app.signed_up("alice").await;
    let (bob, bob_token) = app.signed_up("bob").await;

    let response = send_message(&app, &alice_token, bob, "hi bob").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()["location"].to_str().unwrap().to_owned();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["sender"]["id"], alice);
    assert_eq!(body["receiver"]["id"], bob);

    let response = app.get(&location, &bob_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["content"], "hi bob");
}

#[tokio::test]
async fn unknown_receiver_is_rejected() {
    let app = spawn_app().await;
    let (alice, token) = app.signed_up("alice").await;
    let response = send_message(&app, &token, alice + 50, "hello?").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(response).await, vec!["Invalid ReceiverId"]);
    assert_eq!(app.count("messages").await, 0);
}

#[tokio::test]
async fn outsiders_cannot_read_message() {
    let app = spawn_app().await;
    let (_, alice_token) = app.signed_up("alice").await;
    let (bob, _) = app.signed_up("bob").await;
    let (_, carol_token) = app.signed_up("carol").await;
    let body: Value = send_message(&app, &alice_token, bob, "secret")
        .await
        .json()
        .await
        .unwrap();

    let response = app
        .get(&format!("/api/message/{}", body["id"]), &carol_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/message/999", &carol_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn conversation_filter_covers_both_directions() {
    let app = spawn_app().await;
    let (alice, alice_token) = app.signed_up("alice").await;
    let (bob, bob_token) = app.signed_up("bob").await;
    let (carol, carol_token) = app.signed_up("carol").await;

    send_message(&app, &alice_token, bob, "one").await;
    send_message(&app, &bob_token, alice, "two").await;
    send_message(&app, &carol_token, alice, "three").await;
    send_message(&app, &bob_token, carol, "elsewhere").await;

    let body: Value = app
        .get(&format!("/api/message?receiverId={}", bob), &alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(contents(&body), vec!["two", "one"]);
    assert_eq!(body["totalItems"], 2);

    let body: Value = app
        .get("/api/message", &alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(contents(&body), vec!["three", "two", "one"]);

    let response = app
        .get(&format!("/api/message?receiverId={}", carol), &bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, dave_token) = app.signed_up("dave").await;
    let response = app.get("/api/message", &dave_token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
