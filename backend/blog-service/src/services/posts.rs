/// Post service - post lifecycle, visibility-scoped reads, and the
/// draft -> published state machine
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, PostAction, VisibilityScope};
use crate::db::{comment_repo, post_repo};
use crate::error::{AppError, Result};
use crate::models::{self, Identity, Post, PublishOutcome};

/// Default delay before a new post is published automatically (one hour)
pub const DEFAULT_PUBLISH_DELAY_SECS: i64 = 3600;

pub struct PostService {
    pool: PgPool,
    publish_delay: Duration,
}

impl PostService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            publish_delay: Duration::seconds(DEFAULT_PUBLISH_DELAY_SECS),
        }
    }

    pub fn with_publish_delay(pool: PgPool, delay_secs: i64) -> Self {
        Self {
            pool,
            publish_delay: Duration::seconds(delay_secs),
        }
    }

    /// Create a post as a draft and enqueue its deferred publication.
    ///
    /// The scheduled job is addressed by the post's id; it re-fetches state
    /// at execution time rather than capturing the post here.
    pub async fn create_post(&self, identity: &Identity, title: &str, body: &str) -> Result<Post> {
        auth::authorize_post(identity, PostAction::Create, None)?;
        let owner = identity
            .id
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        models::validate_post_content(title, body)?;

        let post = post_repo::create_post(&self.pool, owner, title, body).await?;

        let publish_at = Utc::now() + self.publish_delay;
        post_repo::schedule_publication(&self.pool, post.id, publish_at).await?;

        tracing::info!(post_id = %post.id, user_id = %owner, %publish_at, "post created as draft");
        Ok(post)
    }

    /// Get a single post under the caller's visibility scope.
    ///
    /// A draft hidden from the caller presents identically to a missing id,
    /// so existence is never confirmed to readers outside the scope.
    pub async fn get_post(&self, identity: &Identity, post_id: Uuid) -> Result<Post> {
        self.visible_post(identity, post_id).await
    }

    /// List the posts the caller's visibility scope admits, newest first
    pub async fn list_posts(&self, identity: &Identity) -> Result<Vec<Post>> {
        let scope = VisibilityScope::for_identity(identity);
        let posts = post_repo::list_posts(&self.pool, &scope).await?;
        Ok(posts)
    }

    /// List published posts only, newest first
    pub async fn list_published(&self) -> Result<Vec<Post>> {
        let posts = post_repo::list_published(&self.pool).await?;
        Ok(posts)
    }

    /// List the caller's own drafts.
    ///
    /// Requires authentication; admins see only their own drafts here, the
    /// manage-all grant applies to direct record operations, not this view.
    pub async fn list_drafts(&self, identity: &Identity) -> Result<Vec<Post>> {
        let owner = identity
            .id
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        let posts = post_repo::list_drafts(&self.pool, owner).await?;
        Ok(posts)
    }

    /// Update a post's title and body
    pub async fn update_post(
        &self,
        identity: &Identity,
        post_id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
    ) -> Result<Post> {
        let post = self.visible_post(identity, post_id).await?;
        auth::authorize_post(identity, PostAction::Update, Some(&post))?;

        let title = title.unwrap_or(&post.title);
        let body = body.unwrap_or(&post.body);
        models::validate_post_content(title, body)?;

        // re-checked on every update: an unpublished post must carry no
        // comments, even though no demotion path exists today
        let comment_count = comment_repo::count_for_post(&self.pool, post.id).await?;
        models::ensure_comments_only_on_published(post.published, comment_count)?;

        let updated = post_repo::update_post_content(&self.pool, post.id, title, body)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        tracing::info!(post_id = %post.id, "post updated");
        Ok(updated)
    }

    /// Destroy a post and, with it, all of its comments
    pub async fn destroy_post(&self, identity: &Identity, post_id: Uuid) -> Result<()> {
        let post = self.visible_post(identity, post_id).await?;
        auth::authorize_post(identity, PostAction::Destroy, Some(&post))?;

        let deleted = post_repo::delete_post(&self.pool, post.id).await?;
        if !deleted {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        tracing::info!(post_id = %post.id, "post destroyed with its comments");
        Ok(())
    }

    /// Publish a post now.
    ///
    /// Idempotent: publishing an already-published post is a successful
    /// no-op reported as `AlreadyPublished`.
    pub async fn publish_post(
        &self,
        identity: &Identity,
        post_id: Uuid,
    ) -> Result<PublishOutcome> {
        let post = self.visible_post(identity, post_id).await?;
        auth::authorize_post(identity, PostAction::Publish, Some(&post))?;

        let newly = post_repo::mark_published(&self.pool, post.id).await?;
        let outcome = PublishOutcome::from_transition(newly);

        match outcome {
            PublishOutcome::NewlyPublished => {
                tracing::info!(post_id = %post.id, "post published")
            }
            PublishOutcome::AlreadyPublished => {
                tracing::info!(post_id = %post.id, "post already published, no change")
            }
        }

        Ok(outcome)
    }

    /// Publish on behalf of the scheduler.
    ///
    /// No identity: the deferred-execution collaborator acts on its own
    /// authority. Returns `None` when the post no longer exists.
    pub async fn publish_by_id(&self, post_id: Uuid) -> Result<Option<PublishOutcome>> {
        if post_repo::find_post_by_id(&self.pool, post_id).await?.is_none() {
            return Ok(None);
        }

        let newly = post_repo::mark_published(&self.pool, post_id).await?;
        Ok(Some(PublishOutcome::from_transition(newly)))
    }

    /// Fetch a post and apply the visibility scope, presenting hidden
    /// drafts as NotFound
    async fn visible_post(&self, identity: &Identity, post_id: Uuid) -> Result<Post> {
        let post = post_repo::find_post_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        if !VisibilityScope::for_identity(identity).matches(&post) {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        Ok(post)
    }
}
