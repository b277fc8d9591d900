use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    data_formats::PageQuery,
    errors::RequestError,
    models::{Friend, FriendRequest},
};

use super::get_user_by_id;

const FRIEND_REQUEST_QUERY: &str = r#"
    SELECT friend_requests.id            AS id,
           friend_requests.sender_id     AS sender_id,
           senders.username              AS sender_username,
           friend_requests.receiver_id   AS receiver_id,
           receivers.username            AS receiver_username,
           friend_requests.request_date  AS request_date,
           friend_requests.is_accepted   AS is_accepted
      FROM friend_requests
      JOIN users AS senders ON senders.id = friend_requests.sender_id
      JOIN users AS receivers ON receivers.id = friend_requests.receiver_id
"#;

pub async fn get_friend_request_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<FriendRequest>, RequestError> {
    let query = format!("{} WHERE friend_requests.id = $1", FRIEND_REQUEST_QUERY);
    let request = sqlx::query_as::<_, FriendRequest>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(request)
}

/// Finds a request between two users regardless of who sent it.
pub async fn find_friend_request_between_in_db(
    conn: &mut SqliteConnection,
    first: i64,
    second: i64,
) -> Result<Option<FriendRequest>, RequestError> {
    let query = format!(
        r#"{} WHERE (friend_requests.sender_id = $1 AND friend_requests.receiver_id = $2)
               OR (friend_requests.sender_id = $2 AND friend_requests.receiver_id = $1)"#,
        FRIEND_REQUEST_QUERY
    );
    let request = sqlx::query_as::<_, FriendRequest>(&query)
        .bind(first)
        .bind(second)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(request)
}

pub async fn are_friends_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    friend_id: i64,
) -> Result<bool, RequestError> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS (SELECT 1 FROM friends WHERE user_id = $1 AND friend_id = $2)",
    )
    .bind(user_id)
    .bind(friend_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(exists != 0)
}

pub async fn insert_friend_request_in_db(
    conn: &mut SqliteConnection,
    sender_id: i64,
    receiver_id: i64,
) -> Result<FriendRequest, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO friend_requests (sender_id, receiver_id, request_date, is_accepted)
        VALUES ($1, $2, $3, FALSE)
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await
    .map_err(|e| RequestError::from(e).or_conflict("Friend request already exist"))?
    .last_insert_rowid();

    match get_friend_request_by_id_in_db(conn, id).await? {
        Some(request) => Ok(request),
        None => Err(RequestError::ServerError),
    }
}

/// Accepts a pending request addressed to `receiver_id`. Marking the request
/// accepted and writing both friendship edges happen in one transaction.
///
/// The guarded UPDATE is the first statement so the transaction takes the
/// write lock up front; concurrent accepts wait on it instead of failing.
pub async fn accept_friend_request_in_db(
    pool: &SqlitePool,
    request_id: i64,
    receiver_id: i64,
) -> Result<FriendRequest, RequestError> {
    let mut tx = pool.begin().await?;
    let updated = sqlx::query(
        r#"
        UPDATE friend_requests SET is_accepted = TRUE
         WHERE id = $1 AND receiver_id = $2 AND is_accepted = FALSE
        "#,
    )
    .bind(request_id)
    .bind(receiver_id)
    .execute(&mut tx)
    .await?;

    let request = match get_friend_request_by_id_in_db(&mut tx, request_id).await? {
        Some(request) => request,
        None => return Err(RequestError::not_found("Friend request", request_id)),
    };
    if updated.rows_affected() == 0 {
        if request.receiver_id != receiver_id {
            return Err(RequestError::Forbidden(
                "You are not allowed to accept this request".to_owned(),
            ));
        }
        return Err(RequestError::Conflict(
            "Friend Request already accepted".to_owned(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO friends (user_id, friend_id, created_at)
        VALUES ($1, $2, $3), ($2, $1, $3)
        "#,
    )
    .bind(request.sender_id)
    .bind(request.receiver_id)
    .bind(Utc::now())
    .execute(&mut tx)
    .await
    .map_err(|e| RequestError::from(e).or_conflict("You are already friends"))?;

    tx.commit().await?;
    Ok(request)
}

pub async fn delete_friend_request_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<(), RequestError> {
    sqlx::query("DELETE FROM friend_requests WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Drops the friendship in both directions together with the request that
/// created it, so the pair can send each other a fresh request later.
pub async fn remove_friend_in_db(
    pool: &SqlitePool,
    user_id: i64,
    friend_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let removed = sqlx::query(
        r#"
        DELETE FROM friends
         WHERE (user_id = $1 AND friend_id = $2)
            OR (user_id = $2 AND friend_id = $1)
        "#,
    )
    .bind(user_id)
    .bind(friend_id)
    .execute(&mut tx)
    .await?;

    if removed.rows_affected() == 0 {
        if get_user_by_id(&mut tx, friend_id).await?.is_none() {
            return Err(RequestError::NotFound(format!(
                "Friend with id '{}' not found",
                friend_id
            )));
        }
        return Err(RequestError::BadRequest("You are not friends".to_owned()));
    }

    sqlx::query(
        r#"
        DELETE FROM friend_requests
         WHERE (sender_id = $1 AND receiver_id = $2)
            OR (sender_id = $2 AND receiver_id = $1)
        "#,
    )
    .bind(user_id)
    .bind(friend_id)
    .execute(&mut tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn count_friends_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<i64, RequestError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM friends WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_friends_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    page: PageQuery,
) -> Result<Vec<Friend>, RequestError> {
    let friends = sqlx::query_as::<_, Friend>(
        r#"
        SELECT users.id            AS id,
               users.username      AS username,
               friends.created_at  AS since
          FROM friends
          JOIN users ON users.id = friends.friend_id
         WHERE friends.user_id = $1
         ORDER BY friends.created_at DESC, users.id DESC
         LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(&mut *conn)
    .await?;
    Ok(friends)
}

pub async fn count_incoming_friend_requests_in_db(
    conn: &mut SqliteConnection,
    receiver_id: i64,
) -> Result<i64, RequestError> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM friend_requests WHERE receiver_id = $1")
            .bind(receiver_id)
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

pub async fn list_incoming_friend_requests_in_db(
    conn: &mut SqliteConnection,
    receiver_id: i64,
    page: PageQuery,
) -> Result<Vec<FriendRequest>, RequestError> {
    let query = format!(
        r#"{} WHERE friend_requests.receiver_id = $1
            ORDER BY friend_requests.request_date DESC, friend_requests.id DESC
            LIMIT $2 OFFSET $3"#,
        FRIEND_REQUEST_QUERY
    );
    let requests = sqlx::query_as::<_, FriendRequest>(&query)
        .bind(receiver_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(requests)
}
