/// Comment handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
}

/// Get comments for a post, newest first
///
/// GET /api/comments/{post_id}
pub async fn list_comments(
    pool: web::Data<PgPool>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comments = service.list_for_post(*post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Add a comment to a post
///
/// POST /api/comments/{post_id}
pub async fn add_comment(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service.add(user_id.0, *post_id, &req.content).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// Update a comment (author only)
///
/// PUT /api/comments/comment/{id}
pub async fn update_comment(
    pool: web::Data<PgPool>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = CommentService::new((**pool).clone());
    let comment = service.update(user_id.0, *comment_id, &req.content).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment (author only)
///
/// DELETE /api/comments/comment/{id}
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.delete(user_id.0, *comment_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Comment deleted" })))
}
