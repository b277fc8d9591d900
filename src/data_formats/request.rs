use serde::{Deserialize, Serialize};
use validator::Validate;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "must be between 3 and 32 characters"))]
    pub user_name: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub user_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

// ----------------- Post Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct PostCreateRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct PostUpdateRequest {
    pub id: i64,
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
    #[serde(default)]
    pub audio_record_id: Option<i64>,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CommentUpdateRequest {
    pub id: i64,
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
}

/// What a comment hangs off. Exactly one of the two ids must be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTarget {
    AudioRecord(i64),
    Post(i64),
}

impl CommentTarget {
    pub fn from_ids(audio_record_id: Option<i64>, post_id: Option<i64>) -> Option<Self> {
        match (audio_record_id, post_id) {
            (Some(id), None) => Some(CommentTarget::AudioRecord(id)),
            (None, Some(id)) => Some(CommentTarget::Post(id)),
            _ => None,
        }
    }
}

// ----------------- Media Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct AudioRecordUpdateRequest {
    pub id: i64,
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub artist: String,
}

/// Multipart body of an audio upload after the form has been read.
#[derive(Debug, Default, Validate)]
pub struct AudioRecordUpload {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "is required"))]
    pub artist: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioRecordUpload {
    pub fn has_audio_file(&self) -> bool {
        !self.bytes.is_empty()
            && self
                .content_type
                .as_deref()
                .map_or(false, |content_type| content_type.starts_with("audio/"))
    }
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoCreateRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub file_path: String,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdateRequest {
    pub id: i64,
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub file_path: String,
}

// ----------------- Social Request -----------------
#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    pub audio_record_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestCreate {
    pub receiver_id: i64,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreateRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub content: String,
    pub receiver_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_target_needs_exactly_one_id() {
        assert_eq!(
            CommentTarget::from_ids(Some(3), None),
            Some(CommentTarget::AudioRecord(3))
        );
        assert_eq!(CommentTarget::from_ids(None, Some(4)), Some(CommentTarget::Post(4)));
        assert_eq!(CommentTarget::from_ids(Some(3), Some(4)), None);
        assert_eq!(CommentTarget::from_ids(None, None), None);
    }

    #[test]
    fn upload_requires_audio_content_type() {
        let mut upload = AudioRecordUpload {
            title: "Song".into(),
            artist: "Band".into(),
            file_name: Some("song.mp3".into()),
            content_type: Some("audio/mpeg".into()),
            bytes: vec![1, 2, 3],
        };
        assert!(upload.has_audio_file());
        upload.content_type = Some("image/png".into());
        assert!(!upload.has_audio_file());
        upload.content_type = Some("audio/mpeg".into());
        upload.bytes.clear();
        assert!(!upload.has_audio_file());
    }

    #[test]
    fn register_request_uses_camel_case() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"userName":"alice","password":"secret1"}"#).unwrap();
        assert_eq!(request.user_name, "alice");
        assert!(request.validate().is_ok());
    }
}
