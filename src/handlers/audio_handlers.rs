use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use crate::{
    authentication::AuthUser,
    config::Config,
    data_formats::{
        AudioRecordResponse, AudioRecordUpdateRequest, AudioRecordUpload, Created, PageQuery,
        PagedListResponse,
    },
    db_helpers::{
        count_audio_records_in_db, delete_audio_record_in_db, get_audio_record_by_id_in_db,
        insert_audio_record_in_db, list_audio_records_in_db, require_current_user,
        update_audio_record_in_db,
    },
    errors::RequestError,
    extract::{ValidJson, ValidQuery},
    uploads::{remove_upload, store_upload},
};

use super::{id_mismatch, Db};

fn multipart_error(error: MultipartError) -> RequestError {
    RequestError::BadRequest(error.to_string())
}

async fn read_audio_upload(mut multipart: Multipart) -> Result<AudioRecordUpload, RequestError> {
    let mut upload = AudioRecordUpload::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "title" => upload.title = field.text().await.map_err(multipart_error)?,
            "artist" => upload.artist = field.text().await.map_err(multipart_error)?,
            "file" => {
                upload.file_name = field.file_name().map(str::to_owned);
                upload.content_type = field.content_type().map(str::to_owned);
                upload.bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            other => tracing::debug!("ignoring multipart field {}", other),
        }
    }
    Ok(upload)
}

// ----------------- Audio Record Handlers -----------------
pub async fn list_audio_records(
    _user: AuthUser,
    Extension(pool): Db,
    ValidQuery(page): ValidQuery<PageQuery>,
) -> Result<PagedListResponse<AudioRecordResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let total_items = count_audio_records_in_db(&mut conn).await?;
    let records = list_audio_records_in_db(&mut conn, page).await?;
    Ok(PagedListResponse::map_from(records, page, total_items))
}

pub async fn get_audio_record(
    _user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
) -> Result<Json<AudioRecordResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    match get_audio_record_by_id_in_db(&mut conn, id).await? {
        Some(record) => Ok(Json(record.into())),
        None => Err(RequestError::not_found("AudioRecord", id)),
    }
}

pub async fn upload_audio_record(
    user: AuthUser,
    Extension(pool): Db,
    Extension(config): Extension<Arc<Config>>,
    multipart: Multipart,
) -> Result<Created<AudioRecordResponse>, RequestError> {
    let upload = read_audio_upload(multipart).await?;
    upload.validate()?;
    if !upload.has_audio_file() {
        return Err(RequestError::BadRequest(
            "Invalid audio file upload.".to_owned(),
        ));
    }

    let mut conn = pool.acquire().await?;
    let uploader = require_current_user(&mut conn, user.id).await?;

    let file_path = store_upload(&config, upload.file_name.as_deref(), &upload.bytes).await?;
    let record = match insert_audio_record_in_db(
        &mut conn,
        uploader.id,
        &upload.title,
        &upload.artist,
        &file_path,
    )
    .await
    {
        Ok(record) => record,
        Err(e) => {
            remove_upload(&config, &file_path).await;
            return Err(e);
        }
    };
    tracing::info!(
        audio_record_id = record.id,
        "user {} uploaded {}",
        uploader.username,
        record.file_path
    );

    Ok(Created::at(
        format!("/api/audiorecords/{}", record.id),
        record.into(),
    ))
}

pub async fn update_audio_record(
    user: AuthUser,
    Extension(pool): Db,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<AudioRecordUpdateRequest>,
) -> Result<StatusCode, RequestError> {
    if id != request.id {
        return Err(id_mismatch());
    }
    let mut conn = pool.acquire().await?;
    let record = match get_audio_record_by_id_in_db(&mut conn, id).await? {
        Some(record) => record,
        None => return Err(RequestError::not_found("AudioRecord", id)),
    };
    user.ensure_owns(record.user_id, "You are not allowed to update this audio record.")?;
    let updated =
        update_audio_record_in_db(&mut conn, id, user.id, &request.title, &request.artist).await?;
    if !updated {
        return Err(RequestError::not_found("AudioRecord", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_audio_record(
    user: AuthUser,
    Extension(pool): Db,
    Extension(config): Extension<Arc<Config>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, RequestError> {
    let mut conn = pool.acquire().await?;
    let record = match get_audio_record_by_id_in_db(&mut conn, id).await? {
        Some(record) => record,
        None => return Err(RequestError::not_found("AudioRecord", id)),
    };
    user.ensure_owns(record.user_id, "You are not allowed to delete this audio record.")?;
    if !delete_audio_record_in_db(&mut conn, id, user.id).await? {
        return Err(RequestError::not_found("AudioRecord", id));
    }

    remove_upload(&config, &record.file_path).await;
    Ok(StatusCode::NO_CONTENT)
}
