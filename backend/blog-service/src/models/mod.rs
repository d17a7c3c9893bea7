/// Data models for blog-service
///
/// This module defines structures for:
/// - Identity: the actor making a request (anonymous, user, or admin)
/// - Post: a blog post, draft by default until published
/// - Comment: a comment attached to a published post
///
/// It also holds the structural validation rules and the cross-entity
/// invariant that comments may only exist on published posts. The invariant
/// lives in one function so the comment-creation and post-update paths can
/// never drift apart.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Actor role. Anonymous callers carry `User` privilege for read rules but
/// are excluded from every authenticated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// The current actor, resolved once per request and passed explicitly into
/// every core operation. Immutable for the lifetime of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: Option<Uuid>,
    pub role: Role,
}

impl Identity {
    /// An unauthenticated caller
    pub fn anonymous() -> Self {
        Self {
            id: None,
            role: Role::User,
        }
    }

    pub fn user(id: Uuid) -> Self {
        Self {
            id: Some(id),
            role: Role::User,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self {
            id: Some(id),
            role: Role::Admin,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.role == Role::Admin
    }
}

/// A blog post. Created as a draft; `published` flips to true exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment on a published post
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a publish attempt. Publishing an already-published post is a
/// successful no-op, reported distinctly so callers can tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    NewlyPublished,
    AlreadyPublished,
}

impl PublishOutcome {
    /// Map the row count of the conditional publish update to an outcome
    pub fn from_transition(newly_published: bool) -> Self {
        if newly_published {
            PublishOutcome::NewlyPublished
        } else {
            PublishOutcome::AlreadyPublished
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, PublishOutcome::NewlyPublished)
    }
}

/// Title and body must be present on every create and update
pub fn validate_post_content(title: &str, body: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("title", "can't be blank"));
    }
    if body.trim().is_empty() {
        return Err(AppError::validation("body", "can't be blank"));
    }
    Ok(())
}

pub fn validate_comment_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(AppError::validation("body", "can't be blank"));
    }
    Ok(())
}

/// Cross-entity invariant: an unpublished post must carry zero comments.
///
/// Called from both mutation paths that could violate it:
/// - comment creation, with the count the post would hold after the insert
/// - post update, with the post's current count (guards against any future
///   demotion path leaving orphaned comments behind)
pub fn ensure_comments_only_on_published(published: bool, comment_count: i64) -> Result<()> {
    if !published && comment_count > 0 {
        return Err(AppError::validation(
            "comments",
            "comments can only be added to published posts",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_identity_has_no_id_and_no_admin_rights() {
        let anon = Identity::anonymous();
        assert!(!anon.is_authenticated());
        assert!(!anon.is_admin());
        assert_eq!(anon.role, Role::User);
    }

    #[test]
    fn admin_identity_requires_authentication() {
        let admin = Identity::admin(Uuid::new_v4());
        assert!(admin.is_authenticated());
        assert!(admin.is_admin());

        let user = Identity::user(Uuid::new_v4());
        assert!(user.is_authenticated());
        assert!(!user.is_admin());
    }

    #[test]
    fn post_content_must_be_present() {
        assert!(validate_post_content("Title", "Body").is_ok());

        let err = validate_post_content("", "Body").unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "title", .. }));

        let err = validate_post_content("Title", "   ").unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "body", .. }));
    }

    #[test]
    fn comment_body_must_be_present() {
        assert!(validate_comment_body("Nice").is_ok());
        let err = validate_comment_body(" \n ").unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "body", .. }));
    }

    #[test]
    fn drafts_may_not_carry_comments() {
        // draft with no comments is fine
        assert!(ensure_comments_only_on_published(false, 0).is_ok());
        // published posts may carry any number
        assert!(ensure_comments_only_on_published(true, 0).is_ok());
        assert!(ensure_comments_only_on_published(true, 12).is_ok());

        // a draft holding comments violates the invariant
        let err = ensure_comments_only_on_published(false, 1).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation {
                field: "comments",
                ..
            }
        ));
    }

    #[test]
    fn comment_admission_uses_the_same_invariant() {
        // creation path passes the post-insert count: draft + first comment
        assert!(ensure_comments_only_on_published(false, 1).is_err());
        // after publishing, the same comment is admitted
        assert!(ensure_comments_only_on_published(true, 1).is_ok());
    }

    #[test]
    fn publish_outcome_distinguishes_first_transition_from_noop() {
        let first = PublishOutcome::from_transition(true);
        let second = PublishOutcome::from_transition(false);
        assert_eq!(first, PublishOutcome::NewlyPublished);
        assert_eq!(second, PublishOutcome::AlreadyPublished);
        assert!(first.changed());
        assert!(!second.changed());
    }
}
