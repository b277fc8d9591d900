use axum::{extract::Path, http::StatusCode, Extension, Json};
use sqlx::SqliteConnection;

use crate::{
    authentication::AuthUser,
    data_formats::{
        CommentCreateRequest, CommentFilter, CommentResponse, CommentTarget,
        CommentUpdateRequest, Created, PageQuery, PagedListResponse,
    },
    db_helpers::{
        audio_record_exists_in_db, count_comments_for_target_in_db, delete_comment_in_db,
        get_comment_by_id_in_db, insert_comment_in_db, list_comments_for_target_in_db,
        post_exists_in_db, require_current_user, update_comment_in_db,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::{id_mismatch, Db};

fn comment_target(
    audio_record_id: Option<i64>,
    post_id: Option<i64>,
) -> Result<CommentTarget, RequestError> {
    CommentTarget::from_ids(audio_record_id, post_id).ok_or_else(|| {
        RequestError::BadRequest("Specify exactly one of audioRecordId or postId.".to_owned())
    })
}

async fn ensure_target_exists(
    conn: &mut SqliteConnection,
    target: CommentTarget,
) -> Result<(), RequestError> {
    let (exists, resource, id) = match target {
        CommentTarget::AudioRecord(id) => {
            (audio_record_exists_in_db(conn, id).await?, "AudioRecord", id)
        }
        CommentTarget::Post(id) => (post_exists_in_db(conn, id).await?, "Post", id),
    };
    if !exists {
        return Err(RequestError::not_found(resource, id));
    }
    Ok(())
}

// ----------------- Comment Handlers -----------------
pub async fn list_comments(
    _user: AuthUser,
    Extension(pool): Db,
    ValidQuery(filter): ValidQuery<CommentFilter>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<CommentResponse>, RequestError> {
    let target = comment_target(filter.audio_record_id, filter.post_id)?;
    let mut conn = pool.acquire().await?;
    ensure_target_exists(&mut conn, target).await?;

    let total_items = count_comments_for_target_in_db(&mut conn, target).await?;
    let comments = list_comments_for_target_in_db(&mut conn, target, page).await?;
    Ok(PagedListResponse::map_from(comments, page, total_items))
}

pub async fn get_comment(
    _user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<CommentResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    match get_comment_by_id_in_db(&mut conn, id).await? {
        Some(comment) => Ok(Json(comment.into())),
        None => Err(RequestError::not_found("Comment", id)),
    }
}

pub async fn create_comment(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<CommentCreateRequest>,
) -> Result<Created<CommentResponse>, RequestError> {
    let target = comment_target(request.audio_record_id, request.post_id)?;
    let mut conn = pool.acquire().await?;
    ensure_target_exists(&mut conn, target).await?;
    let author = require_current_user(&mut conn, user.id).await?;

    let comment = insert_comment_in_db(&mut conn, author.id, &request.content, target).await?;
    Ok(Created::at(
        format!("/api/comment/{}", comment.id),
        comment.into(),
    ))
}

pub async fn update_comment(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<CommentUpdateRequest>,
) -> Result<StatusCode, RequestError> {
    if id != request.id {
        return Err(id_mismatch());
    }
    let mut conn = pool.acquire().await?;
    let comment = match get_comment_by_id_in_db(&mut conn, id).await? {
        Some(comment) => comment,
        None => return Err(RequestError::not_found("Comment", id)),
    };
    user.ensure_owns(comment.user_id, "You are not allowed to update this comment.")?;
    if !update_comment_in_db(&mut conn, id, user.id, &request.content).await? {
        return Err(RequestError::not_found("Comment", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_comment(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    let comment = match get_comment_by_id_in_db(&mut conn, id).await? {
        Some(comment) => comment,
        None => return Err(RequestError::not_found("Comment", id)),
    };
    user.ensure_owns(comment.user_id, "You are not allowed to delete this comment.")?;
    if !delete_comment_in_db(&mut conn, id, user.id).await? {
        return Err(RequestError::not_found("Comment", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
