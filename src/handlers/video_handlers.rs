use axum::{extract::Path, http::StatusCode, Extension, Json};

use crate::{
    authentication::AuthUser,
    data_formats::{
        Created, PageQuery, PagedListResponse, VideoCreateRequest, VideoResponse,
        VideoUpdateRequest,
    },
    db_helpers::{
        count_videos_in_db, delete_video_in_db, get_video_by_id_in_db, insert_video_in_db,
        list_videos_in_db, require_current_user, update_video_in_db, VideoFields,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::{id_mismatch, Db};

// ----------------- Video Handlers -----------------
pub async fn list_videos(
    _user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<VideoResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_videos_in_db(&mut conn).await?;
    let videos = list_videos_in_db(&mut conn, page).await?;
    Ok(PagedListResponse::map_from(videos, page, total_items))
}

pub async fn get_video(
    _user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<VideoResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    match get_video_by_id_in_db(&mut conn, id).await? {
        Some(video) => Ok(Json(video.into())),
        None => Err(RequestError::not_found("Video", id)),
    }
}

pub async fn create_video(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<VideoCreateRequest>,
) -> Result<Created<VideoResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let uploader = require_current_user(&mut conn, user.id).await?;
    let fields = VideoFields {
        title: &request.title,
        description: request.description.as_deref(),
        file_path: &request.file_path,
    };
    let video = insert_video_in_db(&mut conn, uploader.id, fields).await?;
    Ok(Created::at(format!("/api/video/{}", video.id), video.into()))
}

pub async fn update_video(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<VideoUpdateRequest>,
) -> Result<StatusCode, RequestError> {
    if id != request.id {
        return Err(id_mismatch());
    }
    let mut conn = pool.acquire().await?;
    let video = match get_video_by_id_in_db(&mut conn, id).await? {
        Some(video) => video,
        None => return Err(RequestError::not_found("Video", id)),
    };
    user.ensure_owns(video.user_id, "You are not allowed to update this video.")?;
    let fields = VideoFields {
        title: &request.title,
        description: request.description.as_deref(),
        file_path: &request.file_path,
    };
    if !update_video_in_db(&mut conn, id, user.id, fields).await? {
        return Err(RequestError::not_found("Video", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_video(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    let video = match get_video_by_id_in_db(&mut conn, id).await? {
        Some(video) => video,
        None => return Err(RequestError::not_found("Video", id)),
    };
    user.ensure_owns(video.user_id, "You are not allowed to delete this video.")?;
    if !delete_video_in_db(&mut conn, id, user.id).await? {
        return Err(RequestError::not_found("Video", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
