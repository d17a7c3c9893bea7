//! Scheduled Publish Background Job
//!
//! Executes the one-shot deferred publications enqueued at post creation.
//! Each due row is processed by post id: the post is re-fetched at
//! execution time, never operated on from a snapshot captured when the
//! publication was enqueued.
//!
//! Execution is at-least-once: rows are marked completed only after the
//! publish attempt, and the publish itself is an idempotent conditional
//! update, so re-running after a crash (or after a human already published
//! manually) is a safe no-op.

use sqlx::PgPool;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::Result;
use crate::db::post_repo;
use crate::models::PublishOutcome;
use crate::services::PostService;

/// Poll interval between scheduler cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Max due publications processed per cycle
const BATCH_SIZE: i64 = 100;

pub async fn start_publish_scheduler(db: PgPool, poll_interval: Duration) {
    tracing::info!(
        "Starting publish scheduler background job (poll_interval={}s, batch_size={})",
        poll_interval.as_secs(),
        BATCH_SIZE
    );

    let service = PostService::new(db.clone());

    loop {
        sleep(poll_interval).await;

        match run_due_publications(&db, &service).await {
            Ok(0) => {}
            Ok(count) => {
                tracing::info!(published = count, "publish scheduler cycle completed");
            }
            Err(e) => {
                tracing::error!(error = %e, "publish scheduler cycle failed");
            }
        }
    }
}

/// Process due publications, returning how many posts actually transitioned
async fn run_due_publications(db: &PgPool, service: &PostService) -> Result<u64> {
    let due = post_repo::due_publications(db, BATCH_SIZE).await?;
    let mut newly_published = 0u64;

    for post_id in due {
        match service.publish_by_id(post_id).await? {
            None => {
                tracing::info!(%post_id, "scheduled publication target no longer exists");
            }
            Some(PublishOutcome::NewlyPublished) => {
                tracing::info!(%post_id, "scheduled publish applied");
                newly_published += 1;
            }
            Some(PublishOutcome::AlreadyPublished) => {
                tracing::info!(%post_id, "post already published, no change");
            }
        }

        // completed regardless of outcome; there is no cancellation path
        post_repo::complete_publication(db, post_id).await?;
    }

    Ok(newly_published)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_POLL_INTERVAL, Duration::from_secs(30));
        assert_eq!(BATCH_SIZE, 100);
    }
}
