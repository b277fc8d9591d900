use sqlx::SqliteConnection;

use crate::errors::RequestError;

mod audio_helpers;
mod comment_helpers;
mod friend_helpers;
mod like_helpers;
mod message_helpers;
mod post_helpers;
mod user_helpers;
mod video_helpers;

pub use audio_helpers::*;
pub use comment_helpers::*;
pub use friend_helpers::*;
pub use like_helpers::*;
pub use message_helpers::*;
pub use post_helpers::*;
pub use user_helpers::*;
pub use video_helpers::*;

// ----------------- Helper Functions -----------------

/// `SELECT EXISTS(...)` against a table keyed by `id`. `table` is always one of
/// our own table names, never caller input.
async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: i64,
) -> Result<bool, RequestError> {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", table);
    let exists = sqlx::query_scalar::<_, i64>(&query)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists != 0)
}
