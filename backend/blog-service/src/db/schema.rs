use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// Ensure blog-service tables exist.
///
/// We lazily create them at service startup to unblock environments where
/// migrations have not been applied yet (e.g. fresh developer machines or
/// CI spins).
pub async fn ensure_tables(pool: &PgPool) -> Result<()> {
    info!("Ensuring blog-service tables exist");

    sqlx::query(POSTS_TABLE).execute(pool).await?;
    sqlx::query(COMMENTS_TABLE).execute(pool).await?;
    sqlx::query(SCHEDULED_PUBLICATIONS_TABLE).execute(pool).await?;
    sqlx::query(SCHEDULED_PUBLICATIONS_DUE_INDEX).execute(pool).await?;

    Ok(())
}

const POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    published BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const COMMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id UUID NOT NULL,
    body TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

// One row per post; the publish job is addressed by post id, never by a
// captured snapshot of the post.
const SCHEDULED_PUBLICATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS scheduled_publications (
    post_id UUID PRIMARY KEY REFERENCES posts(id) ON DELETE CASCADE,
    publish_at TIMESTAMPTZ NOT NULL,
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const SCHEDULED_PUBLICATIONS_DUE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_scheduled_publications_due
ON scheduled_publications (publish_at)
WHERE completed_at IS NULL
"#;
