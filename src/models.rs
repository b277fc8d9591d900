use chrono::{DateTime, Utc};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub author_username: String,
    pub comments_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub audio_record_id: Option<i64>,
    pub post_id: Option<i64>,
    pub author_username: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AudioRecord {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub user_id: i64,
    pub uploader_username: String,
    pub likes_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub user_id: i64,
    pub uploader_username: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Like {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub audio_record_id: i64,
    pub liked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub request_date: DateTime<Utc>,
    pub is_accepted: bool,
}

impl FriendRequest {
    pub fn involves(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// One side of a friendship edge, seen from the other user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Friend {
    pub id: i64,
    pub username: String,
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
}

impl Message {
    pub fn involves(&self, user_id: i64) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}
