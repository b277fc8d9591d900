use std::sync::Arc;

use axum::{
    http::{StatusCode, Uri},
    Extension,
};
use sqlx::SqlitePool;

use crate::errors::RequestError;

mod audio_handlers;
mod auth_handlers;
mod comment_handlers;
mod friend_handlers;
mod like_handlers;
mod message_handlers;
mod post_handlers;
mod video_handlers;

pub use audio_handlers::*;
pub use auth_handlers::*;
pub use comment_handlers::*;
pub use friend_handlers::*;
pub use like_handlers::*;
pub use message_handlers::*;
pub use post_handlers::*;
pub use video_handlers::*;

type Db = Extension<Arc<SqlitePool>>;

// ----------------- Helper Handlers -----------------
pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}

fn id_mismatch() -> RequestError {
    RequestError::BadRequest("Id in request URL does not match the id in the body.".to_owned())
}
