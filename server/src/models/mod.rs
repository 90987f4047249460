/// Data models for the SocialSphere server
///
/// Entity structs map 1:1 onto the PostgreSQL schema via `sqlx::FromRow`;
/// the `*View` structs are the display-friendly projections handed to API
/// clients (author/sender resolved to summaries, related post resolved to
/// its title).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user row. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub profile_photo_id: Option<Uuid>,
    pub banner_photo_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user projection used wherever another entity resolves its
/// author, sender, or friends.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub profile_photo_id: Option<Uuid>,
}

/// Post entity. The author is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post with its author summary and like set resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: UserSummary,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub likes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment with its author resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Direct message, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Message with both parties resolved, for conversation replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: Uuid,
    pub sender: UserSummary,
    pub recipient: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Notification kind enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Inbound friend request awaiting accept/reject
    FriendRequest,
    /// A friend request was accepted
    FriendAccept,
    /// Someone liked a post
    Like,
    /// Someone commented on a post
    Comment,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::FriendAccept => "friend_accept",
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "friend_request" => Some(NotificationKind::FriendRequest),
            "friend_accept" => Some(NotificationKind::FriendAccept),
            "like" => Some(NotificationKind::Like),
            "comment" => Some(NotificationKind::Comment),
            _ => None,
        }
    }
}

/// Notification row. Created only as a side effect of another mutation;
/// the only permitted update is flipping `read`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub sender_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub post_id: Option<Uuid>,
    pub message: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification with sender and related post resolved for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub sender: UserSummary,
    #[serde(rename = "type")]
    pub kind: String,
    pub post_id: Option<Uuid>,
    pub post_title: Option<String>,
    pub message: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Sort order for post listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
    /// Most liked first
    Popular,
}

impl PostSort {
    /// Parse a query-string sort key; unknown values fall back to newest.
    pub fn parse(s: &str) -> Self {
        match s {
            "oldest" => PostSort::Oldest,
            "popular" => PostSort::Popular,
            _ => PostSort::Newest,
        }
    }
}

/// Typed filter for post listings. Built from query parameters; there is
/// no free-form pattern pass-through into the query.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring match over title and content
    pub search: Option<String>,
    /// Exact tag membership
    pub tag: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Exact author
    pub author: Option<Uuid>,
    pub sort: PostSort,
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
}

/// Stored photo blob, referenced from the user row by id
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaObject {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_kind_round_trip() {
        for kind in [
            NotificationKind::FriendRequest,
            NotificationKind::FriendAccept,
            NotificationKind::Like,
            NotificationKind::Comment,
        ] {
            assert_eq!(NotificationKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NotificationKind::parse("mention"), None);
    }

    #[test]
    fn test_post_sort_parse() {
        assert_eq!(PostSort::parse("oldest"), PostSort::Oldest);
        assert_eq!(PostSort::parse("popular"), PostSort::Popular);
        assert_eq!(PostSort::parse("newest"), PostSort::Newest);
        // Unknown keys fall back to the default ordering
        assert_eq!(PostSort::parse("bogus"), PostSort::Newest);
    }
}
