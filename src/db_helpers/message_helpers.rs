use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{data_formats::PageQuery, errors::RequestError, models::Message};

const MESSAGE_QUERY: &str = r#"
    SELECT messages.id           AS id,
           messages.content      AS content,
           messages.sent_at      AS sent_at,
           messages.sender_id    AS sender_id,
           senders.username      AS sender_username,
           messages.receiver_id  AS receiver_id,
           receivers.username    AS receiver_username
      FROM messages
      JOIN users AS senders ON senders.id = messages.sender_id
      JOIN users AS receivers ON receivers.id = messages.receiver_id
"#;

// $1 is the caller, $2 the optional counterpart. Without a counterpart every
// message the caller sent or received matches.
const CONVERSATION_FILTER: &str = r#"
     WHERE (messages.sender_id = $1 AND (messages.receiver_id = $2 OR $2 IS NULL))
        OR (messages.receiver_id = $1 AND (messages.sender_id = $2 OR $2 IS NULL))
"#;

pub async fn get_message_by_id_in_db(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Message>, RequestError> {
    let query = format!("{} WHERE messages.id = $1", MESSAGE_QUERY);
    let message = sqlx::query_as::<_, Message>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(message)
}

pub async fn insert_message_in_db(
    conn: &mut SqliteConnection,
    sender_id: i64,
    receiver_id: i64,
    content: &str,
) -> Result<Message, RequestError> {
    let id = sqlx::query(
        r#"
        INSERT INTO messages (content, sent_at, sender_id, receiver_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(content)
    .bind(Utc::now())
    .bind(sender_id)
    .bind(receiver_id)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    match get_message_by_id_in_db(conn, id).await? {
        Some(message) => Ok(message),
        None => Err(RequestError::ServerError),
    }
}

pub async fn count_messages_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    counterpart_id: Option<i64>,
) -> Result<i64, RequestError> {
    let query = format!("SELECT COUNT(*) FROM messages {}", CONVERSATION_FILTER);
    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(user_id)
        .bind(counterpart_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn list_messages_in_db(
    conn: &mut SqliteConnection,
    user_id: i64,
    counterpart_id: Option<i64>,
    page: PageQuery,
) -> Result<Vec<Message>, RequestError> {
    let query = format!(
        "{} {} ORDER BY messages.sent_at DESC, messages.id DESC LIMIT $3 OFFSET $4",
        MESSAGE_QUERY, CONVERSATION_FILTER
    );
    let messages = sqlx::query_as::<_, Message>(&query)
        .bind(user_id)
        .bind(counterpart_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await?;
    Ok(messages)
}
