use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{data_formats::PageQuery, errors::RequestError, models::Video};

const VIDEO_QUERY: &str = r#"
    SELECT videos.id           AS id,
           videos.title        AS title,
           videos.description  AS description,
           videos.file_path    AS file_path,
           videos.upload_date  AS upload_date,
           videos.user_id      AS user_id,
           users.username      AS uploader_username
      FROM videos
      JOIN users ON users.id = videos.user_id
"#;

pub struct VideoFields<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub file_path: &'a str,
}

pub async fn count_videos_in_db(conn: &mut SqliteConnection) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_videos_in_db(
    conn: &mut SqliteConnection,
    page: PageQuery,
) -> Result<Vec<Video>, RequestError> {
    let query = format!(
        "{} ORDER BY videos.upload_date DESC, videos.id DESC LIMIT $1 OFFSET $2",
        VIDEO_QUERY
    );
    let videos = sqlx::query_as::<_, Video>(&query)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(videos)
}

pub async fn get_video_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Video>, RequestError> {
    let query = format!("{} WHERE videos.id = $1", VIDEO_QUERY);
    let video = sqlx::query_as::<_, Video>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(video)
}

pub async fn insert_video_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    fields: VideoFields<'_>,
) -> Result<Video, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO videos (title, description, file_path, upload_date, user_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(fields.title)
    .bind(fields.description)
    .bind(fields.file_path)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match get_video_by_id_in_db(conn, id).await? {
        Some(video) => Ok(video),
        None => Err(RequestError::ServerError),
    }
}

pub async fn update_video_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
    fields: VideoFields<'_>,
) -> Result<bool, RequestError> {
    let result = sqlx::query(
        r#"
        UPDATE videos SET title = $1, description = $2, file_path = $3
         WHERE id = $4 AND user_id = $5
        "#,
    )
    .bind(fields.title)
    .bind(fields.description)
    .bind(fields.file_path)
    .bind(id)
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_video_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
