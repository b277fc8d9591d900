use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};

use crate::{
    authentication::{get_jwt_token, hash_password_argon2, verify_password_argon2},
    config::Config,
    data_formats::{LoginRequest, LoginResponse, RegisterRequest, UserResponse},
    db_helpers::{get_user_by_username, insert_user},
    errors::RequestError,
    extract::ValidJson,
};

use super::Db;

// ----------------- User Handlers -----------------
pub async fn register_user(
    Extension(pool): Db,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), RequestError> {
    let mut conn = pool.acquire().await?;
    if get_user_by_username(&mut conn, &request.user_name)
        .await?
        .is_some()
    {
        return Err(RequestError::Conflict("User already exists".to_owned()));
    }

    let password_hash = hash_password_argon2(request.password).await?;
    let user = insert_user(&mut conn, &request.user_name, &password_hash).await?;
    tracing::info!(user_id = user.id, "registered user {}", user.username);

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login_user(
    Extension(pool): Db,
    Extension(config): Extension<Arc<Config>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, RequestError> {
    let mut conn = pool.acquire().await?;
    let user = match get_user_by_username(&mut conn, &request.user_name).await? {
        Some(user) => user,
        None => return Err(RequestError::InvalidCredentials),
    };
    drop(conn);

    let is_password_correct = verify_password_argon2(request.password, user.password).await?;
    if !is_password_correct {
        return Err(RequestError::InvalidCredentials);
    }

    let token = get_jwt_token(&config, user.id, &user.username)?;
    Ok(Json(LoginResponse { token }))
}
