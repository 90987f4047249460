/// Notification handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::NotificationService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

/// All notifications for the current user, newest first
///
/// GET /api/notifications
pub async fn list_notifications(
    pool: web::Data<PgPool>,
    user_id: UserId,
) -> Result<HttpResponse> {
    let service = NotificationService::new((**pool).clone());
    let notifications = service.list(user_id.0).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// Mark a notification as read (recipient only, idempotent)
///
/// PUT /api/notifications/{id}/read
pub async fn mark_as_read(
    pool: web::Data<PgPool>,
    user_id: UserId,
    notification_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = NotificationService::new((**pool).clone());
    let notification = service.mark_read(user_id.0, *notification_id).await?;
    Ok(HttpResponse::Ok().json(notification))
}
