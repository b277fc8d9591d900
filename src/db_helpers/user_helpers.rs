use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{errors::RequestError, models::User};

const USER_QUERY: &str = r#"
    SELECT id, username, password, created_at FROM users
"#;

pub async fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("{} WHERE username = $1", USER_QUERY);
    let result = sqlx::query_as::<_, User>(&query)
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(result)
}

pub async fn get_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>, RequestError> {
    let query = format!("{} WHERE id = $1", USER_QUERY);
    let result = sqlx::query_as::<_, User>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(result)
}

/// Looks up the caller behind a token. A token can outlive its user row, in
/// which case the caller has to authenticate again.
pub async fn require_current_user(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<User, RequestError> {
    match get_user_by_id(conn, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotAuthorized(
            "User not found, try to re-authenticate.",
        )),
    }
}

pub async fn insert_user(
    conn: &mut SqliteConnection,
    username: &str,
    password_hash: &str,
) -> Result<User, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO users (username, password, created_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| RequestError::from(e).or_conflict("User already exists"))?
    .last_insert_rowid();

    match get_user_by_id(conn, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::ServerError),
    }
}
