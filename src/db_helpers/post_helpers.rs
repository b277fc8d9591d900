use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{data_formats::PageQuery, errors::RequestError, models::Post};

use super::row_exists;

const POST_QUERY: &str = r#"
    SELECT posts.id          AS id,
           posts.content     AS content,
           posts.created_at  AS created_at,
           posts.user_id     AS user_id,
           users.username    AS author_username,
           (SELECT COUNT(*)
              FROM comments
             WHERE comments.post_id = posts.id) AS comments_count
      FROM posts
      JOIN users ON users.id = posts.user_id
"#;

pub async fn count_posts_in_db(conn: &mut SqliteConnection) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_posts_in_db(
    conn: &mut SqliteConnection,
    page: PageQuery,
) -> Result<Vec<Post>, RequestError> {
    let query = format!(
        "{} ORDER BY posts.created_at DESC, posts.id DESC LIMIT $1 OFFSET $2",
        POST_QUERY
    );
    let posts = sqlx::query_as::<_, Post>(&query)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(posts)
}

pub async fn get_post_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Post>, RequestError> {
    let query = format!("{} WHERE posts.id = $1", POST_QUERY);
    let post = sqlx::query_as::<_, Post>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(post)
}

pub async fn post_exists_in_db(conn: &mut SqliteConnection, id: i64) -> Result<bool, RequestError> {
    row_exists(conn, "posts", id).await
}

pub async fn insert_post_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    content: &str,
) -> Result<Post, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO posts (content, created_at, user_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(content)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match get_post_by_id_in_db(conn, id).await? {
        Some(post) => Ok(post),
        None => Err(RequestError::ServerError),
    }
}

/// Returns false when no post with `id` belongs to `user_id` any more.
pub async fn update_post_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
    content: &str,
) -> Result<bool, RequestError> {
    let result = sqlx::query("UPDATE posts SET content = $1 WHERE id = $2 AND user_id = $3")
        .bind(content)
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_post_in_db(
    conn: &mut SqliteConnection,
    id: i64,
    user_id: i64,
) -> Result<bool, RequestError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
