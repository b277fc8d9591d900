use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;
use validator::ValidationErrors;

use crate::JsonResponse;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    BadRequest(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    NotAuthorized(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Internal Server Error")]
    ServerError,
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        Self::with_messages(vec![error.to_string()])
    }

    pub fn with_messages(body: Vec<String>) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson { body },
        }
    }
}

impl From<anyhow::Error> for RequestError {
    fn from(value: anyhow::Error) -> Self {
        tracing::error!("internal error: {:#}", value);
        Self::ServerError
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} with ID '{}' not found.", resource, id))
    }

    /// Turns a unique constraint failure into a `Conflict` carrying `message`.
    pub fn or_conflict(self, message: &str) -> Self {
        if let RequestError::DatabaseError(sqlx::Error::Database(e)) = &self {
            if e.message().contains("UNIQUE constraint failed") {
                return RequestError::Conflict(message.to_owned());
            }
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BadRequest(_)
            | RequestError::Validation(_)
            | RequestError::Conflict(_)
            | RequestError::InvalidCredentials => StatusCode::BAD_REQUEST,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden(_) => StatusCode::FORBIDDEN,
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::ServerError | RequestError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let json = match self {
            RequestError::Validation(errors) => {
                RequestErrorJsonWrapper::with_messages(field_messages(errors))
            }
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                RequestErrorJsonWrapper::new("Internal Server Error")
            }
            other => RequestErrorJsonWrapper::new(&other.to_string()),
        };
        (self.status_code(), Json(json))
    }
}

fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let detail = match &error.message {
                    Some(message) => message.to_string(),
                    None => error.code.to_string(),
                };
                format!("{}: {}", field, detail)
            })
        })
        .collect();
    messages.sort();
    messages
}
