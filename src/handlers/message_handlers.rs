use axum::{extract::Path, Extension, Json};

use crate::{
    authentication::AuthUser,
    data_formats::{
        Created, MessageCreateRequest, MessageFilter, MessageResponse, PageQuery,
        PagedListResponse,
    },
    db_helpers::{
        count_messages_in_db, get_message_by_id_in_db, get_user_by_id, insert_message_in_db,
        list_messages_in_db, require_current_user,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::Db;

// ----------------- Message Handlers -----------------
pub async fn send_message(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<MessageCreateRequest>,
) -> Result<Created<MessageResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let sender = require_current_user(&mut conn, user.id).await?;
    if get_user_by_id(&mut conn, request.receiver_id).await?.is_none() {
        return Err(RequestError::BadRequest("Invalid ReceiverId".to_owned()));
    }

    let message =
        insert_message_in_db(&mut conn, sender.id, request.receiver_id, &request.content).await?;
    Ok(Created::at(
        format!("/api/message/{}", message.id),
        message.into(),
    ))
}

/// With `receiverId` only the conversation with that user is listed.
pub async fn list_messages(
    user: AuthUser,
    Extension(pool): Db,
    ValidQuery(filter): ValidQuery<MessageFilter>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<MessageResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_messages_in_db(&mut conn, user.id, filter.receiver_id).await?;
    let messages = list_messages_in_db(&mut conn, user.id, filter.receiver_id, page).await?;
    Ok(PagedListResponse::map_from(messages, page, total_items))
}

pub async fn get_message(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let message = match get_message_by_id_in_db(&mut conn, id).await? {
        Some(message) => message,
        None => return Err(RequestError::not_found("Message", id)),
    };
    if !message.involves(user.id) {
        return Err(RequestError::Forbidden(
            "You are not allowed to read this message".to_owned(),
        ));
    }
    Ok(Json(message.into()))
}
