/// Media blob serving
use crate::error::Result;
use crate::services::MediaService;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

/// Serve a stored photo blob
///
/// GET /api/media/{id}
pub async fn get_media(pool: web::Data<PgPool>, media_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = MediaService::new((**pool).clone());
    let media = service.get(*media_id).await?;

    Ok(HttpResponse::Ok()
        .content_type(media.content_type)
        .body(media.data))
}
