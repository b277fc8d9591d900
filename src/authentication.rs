use std::sync::Arc;

use crate::{config::Config, errors::RequestError};
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Serialize, Deserialize)]
struct AuthClaim {
    id: i64,
    username: String,
    exp: i64,
}

/// The caller, as identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl AuthUser {
    /// Ownership predicate for mutations: the caller must be the stored owner.
    pub fn ensure_owns(&self, owner_id: i64, message: &str) -> Result<(), RequestError> {
        if self.id != owner_id {
            return Err(RequestError::Forbidden(message.to_owned()));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .cloned()
            .ok_or(RequestError::ServerError)?;

        let header = match parts.headers.get(header::AUTHORIZATION) {
            Some(header) => header,
            None => return Err(RequestError::NotAuthorized("User is not authenticated.")),
        };
        let header = match header.to_str() {
            Ok(header) => header,
            Err(_) => {
                tracing::debug!("authorization header is not valid ascii");
                return Err(RequestError::NotAuthorized("Invalid token"));
            }
        };

        let token = match bearer_token(header) {
            Some(token) => token,
            None => {
                tracing::debug!("authorization header without bearer scheme");
                return Err(RequestError::NotAuthorized("Authorization must be Bearer"));
            }
        };

        verify_jwt_token(&config, token)
    }
}

/// Splits `Bearer <token>` with the scheme matched case-insensitively.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim())
}

pub fn get_jwt_token(config: &Config, id: i64, username: &str) -> Result<String> {
    issue_jwt_token(config, id, username, config.jwt_ttl)
}

fn issue_jwt_token(
    config: &Config,
    id: i64,
    username: &str,
    ttl: time::Duration,
) -> Result<String> {
    let expiry_date = OffsetDateTime::now_utc() + ttl;
    let claim = AuthClaim {
        id,
        username: username.to_owned(),
        exp: expiry_date.unix_timestamp(),
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claim,
        &jsonwebtoken::EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .context("Failed to generate jwt token")
}

pub fn verify_jwt_token(config: &Config, token: &str) -> Result<AuthUser, RequestError> {
    let token_data = jsonwebtoken::decode::<AuthClaim>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Error verifying token: {}", e);
        RequestError::NotAuthorized("Invalid Token")
    })?;
    let claim = token_data.claims;
    if claim.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Token expired"));
    }
    Ok(AuthUser {
        id: claim.id,
        username: claim.username,
    })
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Stored password hash is malformed"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> Config {
        Config {
            jwt_secret: secret.to_owned(),
            ..Config::for_tests("wwwroot")
        }
    }

    #[test]
    fn bearer_scheme_matches_any_case() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER  abc "), Some("abc"));
        assert_eq!(bearer_token("Token abc"), None);
        assert_eq!(bearer_token("Bearerabc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }

    #[test]
    fn token_round_trips_identity() {
        let config = test_config("secret");
        let token = get_jwt_token(&config, 7, "alice").unwrap();
        let user = verify_jwt_token(&config, &token).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = get_jwt_token(&test_config("one"), 7, "alice").unwrap();
        let result = verify_jwt_token(&test_config("two"), &token);
        assert!(matches!(result, Err(RequestError::NotAuthorized(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config("secret");
        let token = issue_jwt_token(&config, 7, "alice", time::Duration::minutes(-5)).unwrap();
        assert!(matches!(
            verify_jwt_token(&config, &token),
            Err(RequestError::NotAuthorized(_))
        ));
    }

    #[test]
    fn ownership_predicate() {
        let user = AuthUser {
            id: 1,
            username: "alice".to_owned(),
        };
        assert!(user.ensure_owns(1, "not yours").is_ok());
        assert!(matches!(
            user.ensure_owns(2, "not yours"),
            Err(RequestError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hash = hash_password_argon2("testpassword".to_owned()).await.unwrap();
        assert!(verify_password_argon2("testpassword".to_owned(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("wrongpassword".to_owned(), hash)
            .await
            .unwrap());
    }
}
