use axum::{extract::Path, http::StatusCode, Extension};

use crate::{
    authentication::AuthUser,
    data_formats::{
        AudioRecordWithLikeCountResponse, Created, LikeRequest, LikeResponse, PageQuery,
        PagedListResponse,
    },
    db_helpers::{
        audio_record_exists_in_db, count_audio_records_in_db, count_likes_for_audio_record_in_db,
        delete_like_in_db, get_like_in_db, insert_like_in_db, list_audio_records_in_db,
        list_likes_for_audio_record_in_db, require_current_user,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
};

use super::Db;

// ----------------- Like Handlers -----------------
pub async fn like_audio_record(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<LikeRequest>,
) -> Result<Created<LikeResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let liker = require_current_user(&mut conn, user.id).await?;
    if !audio_record_exists_in_db(&mut conn, request.audio_record_id).await? {
        return Err(RequestError::not_found(
            "AudioRecord",
            request.audio_record_id,
        ));
    }
    if get_like_in_db(&mut conn, liker.id, request.audio_record_id)
        .await?
        .is_some()
    {
        return Err(RequestError::Conflict(
            "You already liked this audio record".to_owned(),
        ));
    }

    let like = insert_like_in_db(&mut conn, liker.id, request.audio_record_id).await?;
    Ok(Created::at(
        format!("/api/like/audiorecord/{}", like.audio_record_id),
        like.into(),
    ))
}

pub async fn unlike_audio_record(
    user: AuthUser,
    Extension(pool): Db,
    ValidJson(request): ValidJson<LikeRequest>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    if !delete_like_in_db(&mut conn, user.id, request.audio_record_id).await? {
        return Err(RequestError::NotFound(format!(
            "Like for audio record '{}' not found.",
            request.audio_record_id
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_likes_for_audio_record(
    _user: AuthUser,
    Extension(pool): Db,
    Path(audio_record_id): Path<i64>,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<LikeResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    if !audio_record_exists_in_db(&mut conn, audio_record_id).await? {
        return Err(RequestError::not_found("AudioRecord", audio_record_id));
    }
    let total_items = count_likes_for_audio_record_in_db(&mut conn, audio_record_id).await?;
    let likes = list_likes_for_audio_record_in_db(&mut conn, audio_record_id, page).await?;
    Ok(PagedListResponse::map_from(likes, page, total_items))
}

pub async fn list_audio_records_with_likes(
    _user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<AudioRecordWithLikeCountResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_audio_records_in_db(&mut conn).await?;
    let records = list_audio_records_in_db(&mut conn, page).await?;
    Ok(PagedListResponse::map_from(records, page, total_items))
}
