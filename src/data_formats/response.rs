use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AudioRecord, Comment, Friend, FriendRequest, Like, Message, Post, User, Video};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub user_name: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostWithCommentCountResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub comments_count: i64,
    pub author: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_record_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    pub author: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AudioRecordResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub uploader: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AudioRecordWithLikeCountResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub likes_count: i64,
    pub uploader: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub upload_date: DateTime<Utc>,
    pub uploader: UserResponse,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: i64,
    pub user: UserResponse,
    pub liked_at: DateTime<Utc>,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestResponse {
    pub id: i64,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub request_date: DateTime<Utc>,
    pub is_accepted: bool,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: i64,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub sender: UserResponse,
    pub receiver: UserResponse,
}

impl UserResponse {
    pub fn new(id: i64, user_name: String) -> Self {
        UserResponse { id, user_name }
    }
}

impl From<User> for UserResponse {
    fn from(User { id, username, .. }: User) -> Self {
        UserResponse::new(id, username)
    }
}

impl From<Friend> for UserResponse {
    fn from(Friend { id, username, .. }: Friend) -> Self {
        UserResponse::new(id, username)
    }
}

impl From<Post> for PostResponse {
    fn from(
        Post {
            id,
            content,
            created_at,
            user_id,
            author_username,
            ..
        }: Post,
    ) -> Self {
        PostResponse {
            id,
            content,
            created_at,
            author: UserResponse::new(user_id, author_username),
        }
    }
}

impl From<Post> for PostWithCommentCountResponse {
    fn from(
        Post {
            id,
            content,
            created_at,
            user_id,
            author_username,
            comments_count,
        }: Post,
    ) -> Self {
        PostWithCommentCountResponse {
            id,
            content,
            created_at,
            comments_count,
            author: UserResponse::new(user_id, author_username),
        }
    }
}

impl From<Comment> for CommentResponse {
    fn from(
        Comment {
            id,
            content,
            created_at,
            user_id,
            audio_record_id,
            post_id,
            author_username,
        }: Comment,
    ) -> Self {
        CommentResponse {
            id,
            content,
            created_at,
            audio_record_id,
            post_id,
            author: UserResponse::new(user_id, author_username),
        }
    }
}

impl From<AudioRecord> for AudioRecordResponse {
    fn from(
        AudioRecord {
            id,
            title,
            artist,
            file_path,
            upload_date,
            user_id,
            uploader_username,
            ..
        }: AudioRecord,
    ) -> Self {
        AudioRecordResponse {
            id,
            title,
            artist,
            file_path,
            upload_date,
            uploader: UserResponse::new(user_id, uploader_username),
        }
    }
}

impl From<AudioRecord> for AudioRecordWithLikeCountResponse {
    fn from(
        AudioRecord {
            id,
            title,
            artist,
            file_path,
            upload_date,
            user_id,
            uploader_username,
            likes_count,
        }: AudioRecord,
    ) -> Self {
        AudioRecordWithLikeCountResponse {
            id,
            title,
            artist,
            file_path,
            upload_date,
            likes_count,
            uploader: UserResponse::new(user_id, uploader_username),
        }
    }
}

impl From<Video> for VideoResponse {
    fn from(
        Video {
            id,
            title,
            description,
            file_path,
            upload_date,
            user_id,
            uploader_username,
        }: Video,
    ) -> Self {
        VideoResponse {
            id,
            title,
            description,
            file_path,
            upload_date,
            uploader: UserResponse::new(user_id, uploader_username),
        }
    }
}

impl From<Like> for LikeResponse {
    fn from(
        Like {
            id,
            user_id,
            username,
            liked_at,
            ..
        }: Like,
    ) -> Self {
        LikeResponse {
            id,
            user: UserResponse::new(user_id, username),
            liked_at,
        }
    }
}

impl From<FriendRequest> for FriendRequestResponse {
    fn from(
        FriendRequest {
            id,
            sender_id,
            sender_username,
            receiver_id,
            receiver_username,
            request_date,
            is_accepted,
        }: FriendRequest,
    ) -> Self {
        FriendRequestResponse {
            id,
            sender: UserResponse::new(sender_id, sender_username),
            receiver: UserResponse::new(receiver_id, receiver_username),
            request_date,
            is_accepted,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(
        Message {
            id,
            content,
            sent_at,
            sender_id,
            sender_username,
            receiver_id,
            receiver_username,
        }: Message,
    ) -> Self {
        MessageResponse {
            id,
            content,
            sent_at,
            sender: UserResponse::new(sender_id, sender_username),
            receiver: UserResponse::new(receiver_id, receiver_username),
        }
    }
}
