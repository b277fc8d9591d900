use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{data_formats::PageQuery, errors::RequestError, models::AudioRecord};

use super::row_exists;

const AUDIO_RECORD_QUERY: &str = r#"
    SELECT audio_records.id           AS id,
           audio_records.title        AS title,
           audio_records.artist       AS artist,
           audio_records.file_path    AS file_path,
           audio_records.upload_date  AS upload_date,
           audio_records.user_id      AS user_id,
           users.username             AS uploader_username,
           (SELECT COUNT(*)
              FROM likes
             WHERE likes.audio_record_id = audio_records.id) AS likes_count
      FROM audio_records
      JOIN users ON users.id = audio_records.user_id
"#;

pub async fn count_audio_records_in_db(conn: &mut SqliteConnection) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audio_records")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_audio_records_in_db(
    conn: &mut SqliteConnection,
    page: PageQuery,
) -> Result<Vec<AudioRecord>, RequestError> {
    let query = format!(
        "{} ORDER BY audio_records.upload_date DESC, audio_records.id DESC LIMIT $1 OFFSET $2",
        AUDIO_RECORD_QUERY
    );
    let records = sqlx::query_as::<_, AudioRecord>(&query)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(records)
}

pub async fn get_audio_record_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<AudioRecord>, RequestError> {
    let query = format!("{} WHERE audio_records.id = $1", AUDIO_RECORD_QUERY);
    let record = sqlx::query_as::<_, AudioRecord>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(record)
}

pub async fn audio_record_exists_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<bool, RequestError> {
    row_exists(conn, "audio_records", id).await
}

pub async fn insert_audio_record_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    title: &str,
    artist: &str,
    file_path: &str,
) -> Result<AudioRecord, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO audio_records (title, artist, file_path, upload_date, user_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(title)
    .bind(artist)
    .bind(file_path)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match get_audio_record_by_id_in_db(conn, id).await? {
        Some(record) => Ok(record),
        None => Err(RequestError::ServerError),
    }
}

pub async fn update_audio_record_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
    title: &str,
    artist: &str,
) -> Result<bool, RequestError> {
    let result = sqlx::query(
        "UPDATE audio_records SET title = $1, artist = $2 WHERE id = $3 AND user_id = $4",
    )
    .bind(title)
    .bind(artist)
    .bind(id)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Likes and comments on the record go with it (ON DELETE CASCADE).
pub async fn delete_audio_record_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM audio_records WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
