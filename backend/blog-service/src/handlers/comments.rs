/// Comment handlers - HTTP endpoints for comment operations
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::Identity;
use crate::services::CommentService;

/// Request body for creating or updating a comment
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "body is required"))]
    pub body: String,
}

/// Create a comment on a post
pub async fn create_comment(
    pool: web::Data<PgPool>,
    identity: Identity,
    post_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .create_comment(&identity, *post_id, &req.body)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// List comments on a post
pub async fn list_post_comments(
    pool: web::Data<PgPool>,
    identity: Identity,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    let comments = service.list_for_post(&identity, *post_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Update a comment
pub async fn update_comment(
    pool: web::Data<PgPool>,
    identity: Identity,
    comment_id: web::Path<Uuid>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let service = CommentService::new((**pool).clone());
    let comment = service
        .update_comment(&identity, *comment_id, &req.body)
        .await?;

    Ok(HttpResponse::Ok().json(comment))
}

/// Delete a comment
pub async fn delete_comment(
    pool: web::Data<PgPool>,
    identity: Identity,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    service.destroy_comment(&identity, *comment_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
