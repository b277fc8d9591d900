use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query},
    http::{request::Parts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::RequestError;

/// JSON body that has been deserialized and validated. Malformed bodies and
/// failed validation are both answered with 400.
pub struct ValidJson<T>(pub T);

#[axum::async_trait]
impl<T, S, B> FromRequest<S, B> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = RequestError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| RequestError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Query string counterpart of [ValidJson].
pub struct ValidQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| RequestError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidQuery(value))
    }
}
