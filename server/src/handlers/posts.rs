/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::{PostFilter, PostSort};
use crate::services::posts::{PostPatch, PostService};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub author: Option<Uuid>,
}

impl From<ListPostsQuery> for PostFilter {
    fn from(q: ListPostsQuery) -> Self {
        PostFilter {
            search: q.search.filter(|s| !s.is_empty()),
            tag: q.tag.filter(|s| !s.is_empty()),
            category: q.category.filter(|s| !s.is_empty()),
            author: q.author,
            sort: q.sort.as_deref().map(PostSort::parse).unwrap_or_default(),
            page: q.page.unwrap_or(1),
            limit: q.limit.unwrap_or(10),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
}

/// List posts with search, filter, sort, and pagination
///
/// GET /api/posts
pub async fn list_posts(
    pool: web::Data<PgPool>,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let page = service.list(&query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Create a new post
///
/// POST /api/posts
pub async fn create_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let service = PostService::new((**pool).clone());
    let post = service
        .create(
            user_id.0,
            &req.title,
            &req.content,
            req.tags.clone(),
            req.category.clone(),
        )
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a single post by ID
///
/// GET /api/posts/{id}
pub async fn get_post(pool: web::Data<PgPool>, post_id: web::Path<Uuid>) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.get(*post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Update a post (author only)
///
/// PUT /api/posts/{id}
pub async fn update_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let service = PostService::new((**pool).clone());
    let post = service
        .update(
            user_id.0,
            *post_id,
            PostPatch {
                title: req.title,
                content: req.content,
                tags: req.tags,
                category: req.category,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post (author only)
///
/// DELETE /api/posts/{id}
pub async fn delete_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    service.delete(user_id.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Post deleted" })))
}

/// Toggle a like on a post
///
/// POST /api/posts/{id}/like
pub async fn like_post(
    pool: web::Data<PgPool>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = PostService::new((**pool).clone());
    let post = service.toggle_like(user_id.0, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}
