use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::VisibilityScope;
use crate::models::Post;

/// Create a new post as a draft
pub async fn create_post(
    pool: &PgPool,
    user_id: Uuid,
    title: &str,
    body: &str,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, title, body, published)
        VALUES ($1, $2, $3, FALSE)
        RETURNING id, user_id, title, body, published, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

/// Find a post by ID
pub async fn find_post_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, body, published, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// List posts under a visibility scope, newest first.
///
/// Each arm mirrors `VisibilityScope::matches` exactly; the scope enum is
/// the single source of the predicate.
pub async fn list_posts(pool: &PgPool, scope: &VisibilityScope) -> Result<Vec<Post>, sqlx::Error> {
    let posts = match scope {
        VisibilityScope::All => {
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, user_id, title, body, published, created_at, updated_at
                FROM posts
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
        VisibilityScope::PublishedOrOwn(user_id) => {
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, user_id, title, body, published, created_at, updated_at
                FROM posts
                WHERE published = TRUE OR user_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(pool)
            .await?
        }
        VisibilityScope::PublishedOnly => {
            sqlx::query_as::<_, Post>(
                r#"
                SELECT id, user_id, title, body, published, created_at, updated_at
                FROM posts
                WHERE published = TRUE
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(posts)
}

/// List published posts, newest first
pub async fn list_published(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    list_posts(pool, &VisibilityScope::PublishedOnly).await
}

/// List a user's own drafts, newest first
pub async fn list_drafts(pool: &PgPool, user_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
    let posts = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, body, published, created_at, updated_at
        FROM posts
        WHERE user_id = $1 AND published = FALSE
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(posts)
}

/// Update a post's title and body
pub async fn update_post_content(
    pool: &PgPool,
    post_id: Uuid,
    title: &str,
    body: &str,
) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $1, body = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING id, user_id, title, body, published, created_at, updated_at
        "#,
    )
    .bind(title)
    .bind(body)
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Delete a post. Comments and any pending scheduled publication go with it
/// via ON DELETE CASCADE.
pub async fn delete_post(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Flip a draft to published.
///
/// A single conditional update, so two concurrent publishers cannot both
/// observe draft state: exactly one caller sees `true` (newly published),
/// every other caller sees `false` (already published, no change).
pub async fn mark_published(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET published = TRUE, updated_at = NOW()
        WHERE id = $1 AND published = FALSE
        "#,
    )
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Enqueue a one-shot deferred publication for a post
pub async fn schedule_publication(
    pool: &PgPool,
    post_id: Uuid,
    publish_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO scheduled_publications (post_id, publish_at)
        VALUES ($1, $2)
        ON CONFLICT (post_id) DO NOTHING
        "#,
    )
    .bind(post_id)
    .bind(publish_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Post ids whose scheduled publication is due and not yet completed
pub async fn due_publications(pool: &PgPool, limit: i64) -> Result<Vec<Uuid>, sqlx::Error> {
    let post_ids: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT post_id
        FROM scheduled_publications
        WHERE publish_at <= NOW() AND completed_at IS NULL
        ORDER BY publish_at
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(post_ids)
}

/// Mark a scheduled publication as executed.
///
/// Marked after the publish attempt; a crash in between re-runs the publish,
/// which the conditional update absorbs as a no-op.
pub async fn complete_publication(pool: &PgPool, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE scheduled_publications
        SET completed_at = NOW()
        WHERE post_id = $1 AND completed_at IS NULL
        "#,
    )
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(())
}
