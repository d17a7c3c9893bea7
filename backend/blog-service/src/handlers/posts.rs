/// Post handlers - HTTP endpoints for post operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::services::PostService;

/// Request body for creating a post
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

/// Request body for updating a post
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "body is required"))]
    pub body: Option<String>,
}

fn service(pool: &web::Data<PgPool>, config: &web::Data<Config>) -> PostService {
    PostService::with_publish_delay(pool.get_ref().clone(), config.publish.delay_secs)
}

/// Create a new post (draft)
pub async fn create_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let post = service(&pool, &config)
        .create_post(&identity, &req.title, &req.body)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// List posts visible to the caller
pub async fn list_posts(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
) -> Result<HttpResponse> {
    let posts = service(&pool, &config).list_posts(&identity).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// List published posts only
pub async fn list_published(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let posts = service(&pool, &config).list_published().await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// List the caller's own drafts
pub async fn list_drafts(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
) -> Result<HttpResponse> {
    let posts = service(&pool, &config).list_drafts(&identity).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// Get a single post
pub async fn get_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = service(&pool, &config).get_post(&identity, *post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Update a post's title and body
pub async fn update_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    req: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let post = service(&pool, &config)
        .update_post(&identity, *post_id, req.title.as_deref(), req.body.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(post))
}

/// Destroy a post and its comments
pub async fn delete_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    service(&pool, &config)
        .destroy_post(&identity, *post_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Publish a post now (idempotent)
pub async fn publish_post(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = service(&pool, &config)
        .publish_post(&identity, *post_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "post_id": *post_id,
        "outcome": outcome,
    })))
}
