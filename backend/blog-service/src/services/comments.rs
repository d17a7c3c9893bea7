/// Comment service - comment lifecycle behind the admission gate
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, CommentAction, VisibilityScope};
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{self, Comment, Identity, Post};

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a comment on a post.
    ///
    /// The admission gate runs before the ownership table: an authenticated
    /// caller commenting on a draft they can see gets a recoverable
    /// validation failure, not an authorization denial. Admins are gated
    /// too; the invariant is about the post's state, not the actor.
    pub async fn create_comment(
        &self,
        identity: &Identity,
        post_id: Uuid,
        body: &str,
    ) -> Result<Comment> {
        let post = self.visible_post(identity, post_id).await?;

        let existing = comment_repo::count_for_post(&self.pool, post.id).await?;
        models::ensure_comments_only_on_published(post.published, existing + 1)?;

        auth::authorize_comment(identity, CommentAction::Create, &post, None)?;
        let author = identity
            .id
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        models::validate_comment_body(body)?;

        let comment = comment_repo::create_comment(&self.pool, post.id, author, body).await?;
        tracing::info!(comment_id = %comment.id, post_id = %post.id, "comment created");
        Ok(comment)
    }

    /// List comments on a post the caller can see, oldest first
    pub async fn list_for_post(&self, identity: &Identity, post_id: Uuid) -> Result<Vec<Comment>> {
        let post = self.visible_post(identity, post_id).await?;
        let comments = comment_repo::list_for_post(&self.pool, post.id).await?;
        Ok(comments)
    }

    /// Update a comment's body (owner or admin)
    pub async fn update_comment(
        &self,
        identity: &Identity,
        comment_id: Uuid,
        body: &str,
    ) -> Result<Comment> {
        let (comment, parent) = self.comment_with_parent(comment_id).await?;
        auth::authorize_comment(identity, CommentAction::Update, &parent, Some(&comment))?;

        models::validate_comment_body(body)?;

        let updated = comment_repo::update_comment(&self.pool, comment.id, body)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;

        tracing::info!(comment_id = %comment.id, "comment updated");
        Ok(updated)
    }

    /// Destroy a comment (owner or admin)
    pub async fn destroy_comment(&self, identity: &Identity, comment_id: Uuid) -> Result<()> {
        let (comment, parent) = self.comment_with_parent(comment_id).await?;
        auth::authorize_comment(identity, CommentAction::Destroy, &parent, Some(&comment))?;

        let deleted = comment_repo::delete_comment(&self.pool, comment.id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("comment {}", comment_id)));
        }

        tracing::info!(comment_id = %comment.id, "comment destroyed");
        Ok(())
    }

    async fn visible_post(&self, identity: &Identity, post_id: Uuid) -> Result<Post> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if !VisibilityScope::for_identity(identity).matches(&post) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        Ok(post)
    }

    /// A comment's parent is always loaded for the authorization check;
    /// the invariant guarantees it is a published post.
    async fn comment_with_parent(&self, comment_id: Uuid) -> Result<(Comment, Post)> {
        let comment = comment_repo::find_comment_by_id(&self.pool, comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("comment {}", comment_id)))?;

        let parent = post_repo::find_post_by_id(&self.pool, comment.post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", comment.post_id)))?;

        Ok((comment, parent))
    }
}
