mod authentication;
pub mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod extract;
mod handlers;
pub mod logging;
mod models;
mod uploads;

use anyhow::Context;
pub use anyhow::Result;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{uri::PathAndQuery, Request, StatusCode, Uri};
use axum::{middleware, routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use errors::{RequestErrorJson, RequestErrorJsonWrapper};
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{net::TcpListener, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(config: Config) -> Result<()> {
    let db = init_db(&config).await?;
    uploads::ensure_uploads_dir(&config).await?;
    let listener = TcpListener::bind(config.bind_addr)
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("Server started on {}", config.bind_addr);
    let app = build_app(make_router(), db, config);
    serve(listener, app).await
}

/// Runs the server on an already bound listener until it fails.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(config: &Config) -> Result<SqlitePool> {
    let db_url = config.database_url.as_str();
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .with_context(|| format!("Failed to create database {}", db_url))?;
    } else {
        tracing::debug!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    tracing::info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

/// Attaches shared state, the uploads folder and request tracing to `router`.
/// API paths are matched case-insensitively.
pub fn build_app(router: Router, db: SqlitePool, config: Config) -> Router {
    let uploads = ServeDir::new(config.uploads_dir());
    let body_limit = config.max_upload_bytes;
    let app = router
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(Arc::new(db)))
        .layer(Extension(Arc::new(config)))
        .layer(TraceLayer::new_for_http());
    // Layers on a router run after its routing, so the rewrite wraps `app` as a fallback.
    Router::new()
        .fallback_service(app)
        .layer(middleware::map_request(lowercase_api_path))
}

async fn lowercase_api_path(mut request: Request<Body>) -> Request<Body> {
    if let Some(uri) = lowercased_api_uri(request.uri()) {
        *request.uri_mut() = uri;
    }
    request
}

/// Returns `uri` with a lowercased path when it is an `/api/` path containing
/// uppercase letters. The query string is kept as is.
fn lowercased_api_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let is_api = path
        .get(..5)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("/api/"));
    if !is_api || !path.bytes().any(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let lowered = match uri.query() {
        Some(query) => format!("{}?{}", path.to_ascii_lowercase(), query),
        None => path.to_ascii_lowercase(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(lowered).ok()?);
    Uri::from_parts(parts).ok()
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login_user))
        .route("/api/post", get(list_posts).post(create_post))
        .route(
            "/api/post/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/comment", get(list_comments).post(create_comment))
        .route(
            "/api/comment/:id",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
        .route(
            "/api/audiorecords",
            get(list_audio_records).post(upload_audio_record),
        )
        .route(
            "/api/audiorecords/:id",
            get(get_audio_record)
                .put(update_audio_record)
                .delete(delete_audio_record),
        )
        .route("/api/video", get(list_videos).post(create_video))
        .route(
            "/api/video/:id",
            get(get_video).put(update_video).delete(delete_video),
        )
        .route(
            "/api/like",
            post(like_audio_record).delete(unlike_audio_record),
        )
        .route("/api/like/audiorecord", get(list_audio_records_with_likes))
        .route(
            "/api/like/audiorecord/:id",
            get(list_likes_for_audio_record),
        )
        .route("/api/friend/request", post(send_friend_request))
        .route("/api/friend/accept/:id", post(accept_friend_request))
        .route("/api/friend/remove/:id", delete(remove_friend))
        .route("/api/friend/friends", get(list_friends))
        .route("/api/friend/requests", get(list_friend_requests))
        .route("/api/friend/:id", delete(delete_friend_request))
        .route("/api/message", get(list_messages).post(send_message))
        .route("/api/message/:id", get(get_message))
        .fallback(not_found)
}
