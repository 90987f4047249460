/// User profile, search, photo, and friend lifecycle handlers
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::UserSummary;
use crate::services::media::decode_photo_payload;
use crate::services::{FriendService, MediaService, UserService};
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Public profile projection: the user row minus credential material,
/// with friends and the inbound pending queue resolved.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub profile_photo_id: Option<Uuid>,
    pub banner_photo_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub friends: Vec<UserSummary>,
    pub friend_requests: Vec<UserSummary>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfilePhotoRequest {
    #[serde(rename = "photoData")]
    pub photo_data: String,
}

#[derive(Debug, Deserialize)]
pub struct BannerPhotoRequest {
    #[serde(rename = "bannerData")]
    pub banner_data: String,
}

/// Get a user profile
///
/// GET /api/users/{id}
pub async fn get_profile(pool: web::Data<PgPool>, user_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let users = UserService::new((**pool).clone());
    let friends = FriendService::new((**pool).clone());

    let user = users
        .get(*user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let response = ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        bio: user.bio,
        profile_photo_id: user.profile_photo_id,
        banner_photo_id: user.banner_photo_id,
        created_at: user.created_at,
        friends: friends.friends_of(user.id).await?,
        friend_requests: friends.pending_requests(user.id).await?,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Update the current user's profile
///
/// PUT /api/users/profile
pub async fn update_profile(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    let service = UserService::new((**pool).clone());
    let user = service
        .update_profile(
            user_id.0,
            req.username.as_deref(),
            req.email.as_deref(),
            req.bio.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Search users by username substring
///
/// GET /api/users/search?q=
pub async fn search_users(
    pool: web::Data<PgPool>,
    user_id: UserId,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let q = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q.trim().to_string(),
        _ => {
            return Err(AppError::InvalidOperation("Query is required".to_string()));
        }
    };

    let service = UserService::new((**pool).clone());
    let users = service.search(user_id.0, &q).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Current user's friends
///
/// GET /api/users/friends
pub async fn get_friends(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    let friends = service.friends_of(user_id.0).await?;
    Ok(HttpResponse::Ok().json(friends))
}

/// Current user's inbound pending friend requests, oldest first
///
/// GET /api/users/requests
pub async fn get_friend_requests(pool: web::Data<PgPool>, user_id: UserId) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    let senders = service.pending_requests(user_id.0).await?;
    Ok(HttpResponse::Ok().json(senders))
}

/// Send a friend request
///
/// POST /api/users/request/{id}
pub async fn send_friend_request(
    pool: web::Data<PgPool>,
    user_id: UserId,
    receiver_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    service.send_request(user_id.0, *receiver_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Friend request sent" })))
}

/// Accept a pending friend request
///
/// POST /api/users/accept/{id}
pub async fn accept_friend_request(
    pool: web::Data<PgPool>,
    user_id: UserId,
    sender_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    service.accept_request(user_id.0, *sender_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Friend request accepted" })))
}

/// Reject a pending friend request
///
/// POST /api/users/reject/{id}
pub async fn reject_friend_request(
    pool: web::Data<PgPool>,
    user_id: UserId,
    sender_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    service.reject_request(user_id.0, *sender_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Friend request rejected" })))
}

/// Remove an existing friend
///
/// POST /api/users/remove/{id}
pub async fn remove_friend(
    pool: web::Data<PgPool>,
    user_id: UserId,
    friend_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = FriendService::new((**pool).clone());
    service.remove_friend(user_id.0, *friend_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Friend removed" })))
}

async fn store_photo(
    pool: &PgPool,
    actor: Uuid,
    payload: &str,
    banner: bool,
) -> Result<HttpResponse> {
    let (content_type, bytes) = decode_photo_payload(payload)?;

    let media = MediaService::new(pool.clone());
    let users = UserService::new(pool.clone());

    let media_id = media.store(actor, &content_type, &bytes).await?;
    users.set_photo(actor, media_id, banner).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": if banner { "Banner photo uploaded" } else { "Profile photo uploaded" },
        "media_id": media_id,
        "url": format!("/api/media/{}", media_id),
    })))
}

/// Upload a profile photo (inline base64 payload)
///
/// POST /api/users/profile/photo
pub async fn upload_profile_photo(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<ProfilePhotoRequest>,
) -> Result<HttpResponse> {
    store_photo(pool.get_ref(), user_id.0, &req.photo_data, false).await
}

/// Upload a banner photo (inline base64 payload)
///
/// POST /api/users/profile/banner
pub async fn upload_banner_photo(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<BannerPhotoRequest>,
) -> Result<HttpResponse> {
    store_photo(pool.get_ref(), user_id.0, &req.banner_data, true).await
}
