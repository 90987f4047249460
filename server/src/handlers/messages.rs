/// Direct message handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::MessageService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub content: String,
}

/// Send a direct message
///
/// POST /api/messages
pub async fn send_message(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    let service = MessageService::new((**pool).clone());
    let message = service
        .send(user_id.0, req.recipient_id, &req.content)
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// Conversation with another user, oldest first
///
/// GET /api/messages/{user_id}
pub async fn get_conversation(
    pool: web::Data<PgPool>,
    user_id: UserId,
    other_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = MessageService::new((**pool).clone());
    let messages = service.conversation(user_id.0, *other_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}
