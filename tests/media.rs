mod common;

use common::{error_messages, spawn_app};
use reqwest::{
    multipart::{Form, Part},
    StatusCode,
};
use serde_json::{json, Value};

#[tokio::test]
async fn uploaded_audio_is_stored_and_served() {
    let app = spawn_app().await;
    let (alice, token) = app.signed_up("alice").await;
    let record = app.upload_audio(&token, "song").await;

    assert_eq!(record["title"], "song");
    assert_eq!(record["artist"], "Someone");
    assert_eq!(record["uploader"]["id"], alice);
    let file_path = record["filePath"].as_str().unwrap();
    assert!(file_path.starts_with("uploads/"));
    assert!(file_path.ends_with(".mp3"));
    assert!(app.root.path().join("wwwroot").join(file_path).exists());

    let response = app
        .client
        .get(app.url(&format!("/{}", file_path)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), &[1u8, 2, 3, 4]);
}

#[tokio::test]
async fn non_audio_upload_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signed_up("alice").await;
    let file = Part::bytes(b"plain text".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let form = Form::new()
        .text("title", "notes")
        .text("artist", "me")
        .part("file", file);
    let response = app
        .post("/api/audiorecords", &token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_messages(response).await,
        vec!["Invalid audio file upload."]
    );
    assert_eq!(app.count("audio_records").await, 0);

    let form = Form::new().text("title", "no file").text("artist", "me");
    let response = app
        .post("/api/audiorecords", &token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audio_owner_updates_and_deletes_with_file() {
    let app = spawn_app().await;
    let (_, alice) = app.signed_up("alice").await;
    let (_, bob) = app.signed_up("bob").await;
    let record = app.upload_audio(&alice, "song").await;
    let id = record["id"].as_i64().unwrap();
    let stored = app
        .root
        .path()
        .join("wwwroot")
        .join(record["filePath"].as_str().unwrap());
    let path = format!("/api/audiorecords/{}", id);

    let response = app
        .put(&path, &bob)
        .json(&json!({ "id": id, "title": "mine now", "artist": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .put(&path, &alice)
        .json(&json!({ "id": id, "title": "renamed", "artist": "alice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body: Value = app.get(&path, &bob).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["title"], "renamed");

    app.post("/api/like", &bob)
        .json(&json!({ "audioRecordId": id }))
        .send()
        .await
        .unwrap();
    let response = app.delete(&path, &bob).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(stored.exists());

    let response = app.delete(&path, &alice).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!stored.exists());
    assert_eq!(app.count("likes").await, 0);
    let response = app.get(&path, &alice).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn audio_list_is_enveloped() {
    let app = spawn_app().await;
    let (_, token) = app.signed_up("alice").await;
    let response = app.get("/api/audiorecords", &token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    app.upload_audio(&token, "first").await;
    app.upload_audio(&token, "second").await;
    let body: Value = app
        .get("/api/audiorecords?pageSize=1", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["totalItems"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["items"][0]["title"], "second");
}

#[tokio::test]
async fn video_crud() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.signed_up("alice").await;
    let (_, bob) = app.signed_up("bob").await;

    let response = app
        .post("/api/video", &alice)
        .json(&json!({ "title": "clip", "filePath": "videos/clip.mp4" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["uploader"]["id"], alice_id);
    let path = format!("/api/video/{}", id);

    let update = json!({
        "id": id,
        "title": "clip v2",
        "description": "longer",
        "filePath": "videos/clip2.mp4"
    });
    let response = app.put(&path, &bob).json(&update).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.put(&path, &alice).json(&update).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body: Value = app
        .get("/api/video", &bob)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["items"][0]["title"], "clip v2");
    assert_eq!(body["items"][0]["description"], "longer");

    let response = app.delete(&path, &bob).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.delete(&path, &alice).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.get(&path, &alice).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn video_requires_title_and_path() {
    let app = spawn_app().await;
    let (_, token) = app.signed_up("alice").await;
    let response = app
        .post("/api/video", &token)
        .json(&json!({ "title": "", "filePath": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(response).await.len(), 2);
    assert_eq!(app.count("videos").await, 0);
}
