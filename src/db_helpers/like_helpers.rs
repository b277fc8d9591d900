use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{data_formats::PageQuery, errors::RequestError, models::Like};

const LIKE_QUERY: &str = r#"
    SELECT likes.id               AS id,
           likes.user_id          AS user_id,
           users.username         AS username,
           likes.audio_record_id  AS audio_record_id,
           likes.liked_at         AS liked_at
      FROM likes
      JOIN users ON users.id = likes.user_id
"#;

pub async fn get_like_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    audio_record_id: i64,
) -> Result<Option<Like>, RequestError> {
    let query = format!(
        "{} WHERE likes.user_id = $1 AND likes.audio_record_id = $2",
        LIKE_QUERY
    );
    let like = sqlx::query_as::<_, Like>(&query)
        .bind(user_id)
        .bind(audio_record_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(like)
}

/// The (user, audio record) pair is unique, so a concurrent duplicate like
/// surfaces as a `Conflict` rather than a second row.
pub async fn insert_like_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    audio_record_id: i64,
) -> Result<Like, RequestError> {
    sqlx::query(
        r#"
        INSERT INTO likes (user_id, audio_record_id, liked_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(audio_record_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| RequestError::from(e).or_conflict("You already liked this audio record"))?;

    match get_like_in_db(conn, user_id, audio_record_id).await? {
        Some(like) => Ok(like),
        None => Err(RequestError::ServerError),
    }
}

/// Returns whether a like was removed.
pub async fn delete_like_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    audio_record_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND audio_record_id = $2")
        .bind(user_id)
        .bind(audio_record_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_likes_for_audio_record_in_db(
    conn: &mut SqliteConnection,
    audio_record_id: i64,
) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE audio_record_id = $1")
        .bind(audio_record_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_likes_for_audio_record_in_db(
    conn: &mut SqliteConnection,
    audio_record_id: i64,
    page: PageQuery,
) -> Result<Vec<Like>, RequestError> {
    let query = format!(
        "{} WHERE likes.audio_record_id = $1 ORDER BY likes.liked_at DESC, likes.id DESC LIMIT $2 OFFSET $3",
        LIKE_QUERY
    );
    let likes = sqlx::query_as::<_, Like>(&query)
        .bind(audio_record_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(likes)
}
