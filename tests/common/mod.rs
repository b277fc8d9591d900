#![allow(dead_code)]

use std::net::TcpListener;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use socialweb::{build_app, init_db, make_router, serve, Config};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const PASSWORD: &str = "testpassword";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub pool: SqlitePool,
    pub root: TempDir,
}

/// Starts a server on an ephemeral port backed by a fresh database and web root.
pub async fn spawn_app() -> TestApp {
    let root = TempDir::new().expect("Failed to create temp dir");
    let config = Config {
        database_url: format!("sqlite://{}", root.path().join("test.db").display()),
        jwt_secret: "test-secret".to_owned(),
        jwt_ttl: time::Duration::minutes(10),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        web_root: root.path().join("wwwroot"),
        max_upload_bytes: 1024 * 1024,
    };
    std::fs::create_dir_all(config.uploads_dir()).unwrap();

    let pool = init_db(&config).await.expect("Failed to init db");
    let listener = TcpListener::bind(config.bind_addr).unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let app = build_app(make_router(), pool.clone(), config);
    tokio::spawn(serve(listener, app));

    TestApp {
        address,
        client: Client::new(),
        pool,
        root,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn get(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "userName": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "userName": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Registers `username` and returns its id and a fresh token.
    pub async fn signed_up(&self, username: &str) -> (i64, String) {
        let response = self.register(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let user: Value = response.json().await.unwrap();

        let response = self.login(username, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        let token = body["token"].as_str().unwrap().to_owned();
        (user["id"].as_i64().unwrap(), token)
    }

    pub async fn create_post(&self, token: &str, content: &str) -> i64 {
        let response = self
            .post("/api/post", token)
            .json(&json!({ "content": content }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    pub async fn upload_audio(&self, token: &str, title: &str) -> Value {
        let file = reqwest::multipart::Part::bytes(vec![1u8, 2, 3, 4])
            .file_name("track.mp3")
            .mime_str("audio/mpeg")
            .unwrap();
        let form = reqwest::multipart::Form::new()
            .text("title", title.to_owned())
            .text("artist", "Someone")
            .part("file", file);
        let response = self
            .post("/api/audiorecords", token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

pub async fn error_messages(response: Response) -> Vec<String> {
    let body: Value = response.json().await.unwrap();
    body["errors"]["body"]
        .as_array()
        .unwrap()
        .iter()
        .map(|message| message.as_str().unwrap().to_owned())
        .collect()
}
