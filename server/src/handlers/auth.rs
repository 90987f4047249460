/// Registration and login handlers
use crate::error::{AppError, Result};
use crate::models::UserSummary;
use crate::security::jwt::JwtKeys;
use crate::services::UserService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Create a new account
///
/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let summary = service
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(HttpResponse::Created().json(summary))
}

/// Exchange credentials for a signed access token
///
/// POST /api/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    keys: web::Data<JwtKeys>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = UserService::new((**pool).clone());
    let user = service.login(&req.email, &req.password).await?;

    let token = keys
        .generate_token(user.id, &user.email, &user.username)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
            profile_photo_id: user.profile_photo_id,
        },
    }))
}
