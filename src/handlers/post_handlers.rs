use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::AuthUser,
    data_formats::{
        Created, PageQuery, PagedListResponse, PostCreateRequest, PostResponse,
        PostUpdateRequest, PostWithCommentCountResponse,
    },
    db_helpers::{
        count_posts_in_db, delete_post_in_db, get_post_by_id_in_db, insert_post_in_db,
        list_posts_in_db, require_current_user, update_post_in_db,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::{id_mismatch, Db};

// ----------------- Post Handlers -----------------
pub async fn list_posts(
    _user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<PostWithCommentCountResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_posts_in_db(&mut conn).await?;
    let posts = list_posts_in_db(&mut conn, page).await?;
    Ok(PagedListResponse::map_from(posts, page, total_items))
}

pub async fn get_post(
    _user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    match get_post_by_id_in_db(&mut conn, id).await? {
        Some(post) => Ok(Json(post.into())),
        None => Err(RequestError::not_found("Post", id)),
    }
}

pub async fn create_post(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<PostCreateRequest>,
) -> Result<Created<PostResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let author = require_current_user(&mut conn, user.id).await?;
    let post = insert_post_in_db(&mut conn, author.id, &request.content).await?;
    Ok(Created::at(format!("/api/post/{}", post.id), post.into()))
}

pub async fn update_post(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<PostUpdateRequest>,
) -> Result<StatusCode, RequestError> {
    if id != request.id {
        return Err(id_mismatch());
    }
    let mut conn = pool.acquire().await?;
    let post = match get_post_by_id_in_db(&mut conn, id).await? {
        Some(post) => post,
        None => return Err(RequestError::not_found("Post", id)),
    };
    user.ensure_owns(post.user_id, "You are not allowed to update this post.")?;
    if !update_post_in_db(&mut conn, id, user.id, &request.content).await? {
        return Err(RequestError::not_found("Post", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_post(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    let post = match get_post_by_id_in_db(&mut conn, id).await? {
        Some(post) => post,
        None => return Err(RequestError::not_found("Post", id)),
    };
    user.ensure_owns(post.user_id, "You are not allowed to delete this post.")?;
    if !delete_post_in_db(&mut conn, id, user.id).await? {
        return Err(RequestError::not_found("Post", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
