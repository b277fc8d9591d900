use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::AuthUser,
    data_formats::{
        FriendRequestCreate, FriendRequestResponse, PageQuery, PagedListResponse, UserResponse,
    },
    db_helpers::{
        accept_friend_request_in_db, are_friends_in_db, count_friends_in_db,
        count_incoming_friend_requests_in_db, delete_friend_request_in_db,
        find_friend_request_between_in_db, get_friend_request_by_id_in_db, get_user_by_id,
        insert_friend_request_in_db, list_friends_in_db, list_incoming_friend_requests_in_db,
        remove_friend_in_db, require_current_user,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::Db;

// ----------------- Friend Handlers -----------------
pub async fn send_friend_request(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<FriendRequestCreate>,
) -> Result<(StatusCode, Json<FriendRequestResponse>), RequestError> {
    let mut conn = pool.acquire().await?;
    let sender = require_current_user(&mut conn, user.id).await?;
    if get_user_by_id(&mut conn, request.receiver_id).await?.is_none() {
        return Err(RequestError::not_found("User", request.receiver_id));
    }
    if sender.id == request.receiver_id {
        return Err(RequestError::BadRequest(
            "You can not send request to yourself".to_owned(),
        ));
    }
    if find_friend_request_between_in_db(&mut conn, sender.id, request.receiver_id)
        .await?
        .is_some()
    {
        return Err(RequestError::Conflict(
            "Friend request already exist".to_owned(),
        ));
    }
    if are_friends_in_db(&mut conn, sender.id, request.receiver_id).await? {
        return Err(RequestError::Conflict("You are already friends".to_owned()));
    }

    let friend_request =
        insert_friend_request_in_db(&mut conn, sender.id, request.receiver_id).await?;
    Ok((StatusCode::CREATED, Json(friend_request.into())))
}

pub async fn accept_friend_request(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<FriendRequestResponse>, RequestError> {
    let friend_request = accept_friend_request_in_db(&pool, id, user.id).await?;
    tracing::info!(
        request_id = friend_request.id,
        "{} and {} are now friends",
        friend_request.sender_username,
        friend_request.receiver_username
    );
    Ok(Json(friend_request.into()))
}

pub async fn delete_friend_request(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    let friend_request = match get_friend_request_by_id_in_db(&mut conn, id).await? {
        Some(friend_request) => friend_request,
        None => {
            return Err(RequestError::NotFound(format!(
                "Friend request with id '{}' not found",
                id
            )))
        }
    };
    if !friend_request.involves(user.id) {
        return Err(RequestError::Forbidden(
            "You are not allowed to delete this request".to_owned(),
        ));
    }
    delete_friend_request_in_db(&mut conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_friend(
    user: AuthUser,
    Extension(pool): Db,
    Path(friend_id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    remove_friend_in_db(&pool, user.id, friend_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_friends(
    user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<UserResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_friends_in_db(&mut conn, user.id).await?;
    let friends = list_friends_in_db(&mut conn, user.id, page).await?;
    Ok(PagedListResponse::map_from(friends, page, total_items))
}

pub async fn list_friend_requests(
    user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<FriendRequestResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_incoming_friend_requests_in_db(&mut conn, user.id).await?;
    let requests = list_incoming_friend_requests_in_db(&mut conn, user.id, page).await?;
    Ok(PagedListResponse::map_from(requests, page, total_items))
}
