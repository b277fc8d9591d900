use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
const DEFAULT_WEB_ROOT: &str = "wwwroot";
const DEFAULT_JWT_TTL_MINUTES: i64 = 10;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Folder under the web root that holds uploaded files. Stored file paths are
/// relative to the web root, so they always start with this segment.
pub const UPLOADS_FOLDER: &str = "uploads";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: time::Duration,
    pub bind_addr: SocketAddr,
    pub web_root: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_ttl_minutes: i64 = optional_var("JWT_TTL_MINUTES")?.unwrap_or(DEFAULT_JWT_TTL_MINUTES);
        let bind_addr = match optional_var("BIND_ADDR")? {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR.parse()?,
        };
        let web_root = std::env::var("WEB_ROOT").unwrap_or_else(|_| DEFAULT_WEB_ROOT.to_owned());
        let max_upload_bytes = optional_var("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Config {
            database_url,
            jwt_secret,
            jwt_ttl: time::Duration::minutes(jwt_ttl_minutes),
            bind_addr,
            web_root: PathBuf::from(web_root),
            max_upload_bytes,
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.web_root.join(UPLOADS_FOLDER)
    }
}

fn optional_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {}", name, value)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
impl Config {
    /// In-memory database, secret "secret" and defaults for everything else.
    pub(crate) fn for_tests(web_root: impl Into<PathBuf>) -> Config {
        Config {
            database_url: "sqlite::memory:".to_owned(),
            jwt_secret: "secret".to_owned(),
            jwt_ttl: time::Duration::minutes(DEFAULT_JWT_TTL_MINUTES),
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
            web_root: web_root.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
