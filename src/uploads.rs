use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{Config, UPLOADS_FOLDER};

const MAX_EXTENSION_LEN: usize = 10;

pub async fn ensure_uploads_dir(config: &Config) -> Result<()> {
    let dir = config.uploads_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create uploads directory {}", dir.display()))
}

/// Writes `bytes` under a fresh name in the uploads folder and returns the path
/// relative to the web root, e.g. `uploads/3f0c....mp3`.
pub async fn store_upload(config: &Config, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
    let file_name = match original_name.and_then(safe_extension) {
        Some(extension) => format!("{}.{}", uuid::Uuid::new_v4(), extension),
        None => uuid::Uuid::new_v4().to_string(),
    };
    let target = config.uploads_dir().join(&file_name);
    tokio::fs::write(&target, bytes)
        .await
        .with_context(|| format!("Failed to write upload {}", target.display()))?;
    Ok(format!("{}/{}", UPLOADS_FOLDER, file_name))
}

/// Removes a previously stored upload. Paths that do not point into the
/// uploads folder are ignored.
pub async fn remove_upload(config: &Config, relative_path: &str) {
    let Some(path) = resolve_upload(config, relative_path) else {
        tracing::warn!("refusing to remove {} outside the uploads folder", relative_path);
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("could not remove upload {}: {}", path.display(), e);
    }
}

fn resolve_upload(config: &Config, relative_path: &str) -> Option<PathBuf> {
    let file_name = relative_path.strip_prefix(UPLOADS_FOLDER)?.strip_prefix('/')?;
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
        return None;
    }
    Some(config.uploads_dir().join(file_name))
}

fn safe_extension(original_name: &str) -> Option<String> {
    let extension = Path::new(original_name).extension()?.to_str()?;
    if extension.is_empty()
        || extension.len() > MAX_EXTENSION_LEN
        || !extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_plain_extensions() {
        assert_eq!(safe_extension("song.MP3"), Some("mp3".to_owned()));
        assert_eq!(safe_extension("archive.tar.gz"), Some("gz".to_owned()));
        assert_eq!(safe_extension("noext"), None);
        assert_eq!(safe_extension("weird.m p3"), None);
        assert_eq!(safe_extension("long.abcdefghijklmnop"), None);
    }

    #[test]
    fn resolves_only_inside_uploads() {
        let config = Config::for_tests("/srv/www");
        assert_eq!(
            resolve_upload(&config, "uploads/a.mp3"),
            Some(PathBuf::from("/srv/www/uploads/a.mp3"))
        );
        assert_eq!(resolve_upload(&config, "uploads/../secret"), None);
        assert_eq!(resolve_upload(&config, "other/a.mp3"), None);
        assert_eq!(resolve_upload(&config, "uploads/"), None);
    }

    #[tokio::test]
    async fn stores_and_removes_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let config = Config::for_tests(root.clone());
        ensure_uploads_dir(&config).await.unwrap();

        let relative = store_upload(&config, Some("track.ogg"), b"OggS").await.unwrap();
        assert!(relative.starts_with("uploads/"));
        assert!(relative.ends_with(".ogg"));
        let stored = root.join(&relative);
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), b"OggS");

        remove_upload(&config, &relative).await;
        assert!(!stored.exists());
    }
}
