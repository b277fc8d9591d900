use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    data_formats::{CommentTarget, PageQuery},
    errors::RequestError,
    models::Comment,
};

const COMMENT_QUERY: &str = r#"
    SELECT comments.id               AS id,
           comments.content          AS content,
           comments.created_at       AS created_at,
           comments.user_id          AS user_id,
           comments.audio_record_id  AS audio_record_id,
           comments.post_id          AS post_id,
           users.username            AS author_username
      FROM comments
      JOIN users ON users.id = comments.user_id
"#;

impl CommentTarget {
    fn column(&self) -> &'static str {
        match self {
            CommentTarget::AudioRecord(_) => "audio_record_id",
            CommentTarget::Post(_) => "post_id",
        }
    }

    fn id(&self) -> i64 {
        match self {
            CommentTarget::AudioRecord(id) | CommentTarget::Post(id) => *id,
        }
    }
}

pub async fn count_comments_for_target_in_db(
    conn: &mut SqliteConnection,
    target: CommentTarget,
) -> Result<i64, RequestError> {
    let query = format!("SELECT COUNT(*) FROM comments WHERE {} = $1", target.column());
    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(target.id())
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_comments_for_target_in_db(
    conn: &mut SqliteConnection,
    target: CommentTarget,
    page: PageQuery,
) -> Result<Vec<Comment>, RequestError> {
    let query = format!(
        "{} WHERE comments.{} = $1 ORDER BY comments.created_at DESC, comments.id DESC LIMIT $2 OFFSET $3",
        COMMENT_QUERY,
        target.column()
    );
    let comments = sqlx::query_as::<_, Comment>(&query)
        .bind(target.id())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(comments)
}

pub async fn get_comment_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Comment>, RequestError> {
    let query = format!("{} WHERE comments.id = $1", COMMENT_QUERY);
    let comment = sqlx::query_as::<_, Comment>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(comment)
}

pub async fn insert_comment_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    content: &str,
    target: CommentTarget,
) -> Result<Comment, RequestError> {
    let (audio_record_id, post_id) = match target {
        CommentTarget::AudioRecord(id) => (Some(id), None),
        CommentTarget::Post(id) => (None, Some(id)),
    };
    let id = sqlx::query(
        r#"
        INSERT INTO comments (content, created_at, user_id, audio_record_id, post_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(content)
    .bind(Utc::now())
    .bind(user_id)
    .bind(audio_record_id)
    .bind(post_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match get_comment_by_id_in_db(conn, id).await? {
        Some(comment) => Ok(comment),
        None => Err(RequestError::ServerError),
    }
}

pub async fn update_comment_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
    content: &str,
) -> Result<bool, RequestError> {
    let result = sqlx::query("UPDATE comments SET content = $1 WHERE id = $2 AND user_id = $3")
        .bind(content)
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_comment_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
