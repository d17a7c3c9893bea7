/// Authorization engine for blog-service
///
/// A flat decision table over (identity, action, resource snapshot). First
/// matching rule wins, default deny:
///
/// - admins may do anything
/// - any authenticated identity may create posts
/// - anyone may read a post their visibility scope admits
/// - owners may update, destroy, and publish their own posts
/// - any authenticated identity may comment on a published post
/// - owners may update and destroy their own comments
///
/// The `can_*` functions are pure and side-effect free; `authorize_*` wraps
/// them into typed errors for the service layer. Read access delegates to
/// [`scope::VisibilityScope`] so listings and direct-by-id reads can never
/// diverge.
pub mod scope;

pub use scope::VisibilityScope;

use crate::error::{AppError, Result};
use crate::models::{Comment, Identity, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    Read,
    Create,
    Update,
    Destroy,
    Publish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Create,
    Update,
    Destroy,
}

/// Decide whether `identity` may perform `action` on a post.
///
/// `post` is `None` only for `Create`, which has no target instance yet.
pub fn can_act_on_post(identity: &Identity, action: PostAction, post: Option<&Post>) -> bool {
    if identity.is_admin() {
        return true;
    }

    match (action, post) {
        (PostAction::Create, _) => identity.is_authenticated(),
        (PostAction::Read, Some(post)) => VisibilityScope::for_identity(identity).matches(post),
        (PostAction::Update | PostAction::Destroy | PostAction::Publish, Some(post)) => {
            identity.is_authenticated() && identity.id == Some(post.user_id)
        }
        _ => false,
    }
}

/// Decide whether `identity` may perform `action` on a comment under `parent`.
///
/// `comment` is `None` only for `Create`.
pub fn can_act_on_comment(
    identity: &Identity,
    action: CommentAction,
    parent: &Post,
    comment: Option<&Comment>,
) -> bool {
    if identity.is_admin() {
        return true;
    }
    if !identity.is_authenticated() {
        return false;
    }

    match (action, comment) {
        (CommentAction::Create, _) => parent.published,
        (CommentAction::Update | CommentAction::Destroy, Some(comment)) => {
            identity.id == Some(comment.user_id)
        }
        _ => false,
    }
}

/// Authorize a post action, mapping denial to a typed error.
///
/// Unauthenticated denials surface as `Unauthorized`; authenticated denials
/// as `Forbidden`. Hidden-draft reads are handled by the service layer,
/// which presents them as `NotFound` so existence is never confirmed.
pub fn authorize_post(identity: &Identity, action: PostAction, post: Option<&Post>) -> Result<()> {
    if can_act_on_post(identity, action, post) {
        return Ok(());
    }
    Err(denial(identity))
}

pub fn authorize_comment(
    identity: &Identity,
    action: CommentAction,
    parent: &Post,
    comment: Option<&Comment>,
) -> Result<()> {
    if can_act_on_comment(identity, action, parent, comment) {
        return Ok(());
    }
    Err(denial(identity))
}

fn denial(identity: &Identity) -> AppError {
    if identity.is_authenticated() {
        AppError::Forbidden("you don't have permission to perform this action".to_string())
    } else {
        AppError::Unauthorized("authentication required".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn post(owner: Uuid, published: bool) -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            user_id: owner,
            title: "T".to_string(),
            body: "B".to_string(),
            published,
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(post_id: Uuid, owner: Uuid) -> Comment {
        let now = Utc::now();
        Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id: owner,
            body: "Nice".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_may_do_anything() {
        let admin = Identity::admin(Uuid::new_v4());
        let other = Uuid::new_v4();
        let draft = post(other, false);
        let published = post(other, true);

        for action in [
            PostAction::Read,
            PostAction::Update,
            PostAction::Destroy,
            PostAction::Publish,
        ] {
            assert!(can_act_on_post(&admin, action, Some(&draft)));
            assert!(can_act_on_post(&admin, action, Some(&published)));
        }
        assert!(can_act_on_post(&admin, PostAction::Create, None));

        let c = comment(published.id, other);
        assert!(can_act_on_comment(&admin, CommentAction::Update, &published, Some(&c)));
        assert!(can_act_on_comment(&admin, CommentAction::Destroy, &published, Some(&c)));
    }

    #[test]
    fn anonymous_may_only_read_published_posts() {
        let anon = Identity::anonymous();
        let owner = Uuid::new_v4();
        let draft = post(owner, false);
        let published = post(owner, true);

        assert!(can_act_on_post(&anon, PostAction::Read, Some(&published)));
        assert!(!can_act_on_post(&anon, PostAction::Read, Some(&draft)));

        // reads are the only thing an anonymous caller gets
        assert!(!can_act_on_post(&anon, PostAction::Create, None));
        for action in [PostAction::Update, PostAction::Destroy, PostAction::Publish] {
            assert!(!can_act_on_post(&anon, action, Some(&published)));
        }
        assert!(!can_act_on_comment(&anon, CommentAction::Create, &published, None));
    }

    #[test]
    fn owner_may_manage_own_posts_but_not_others() {
        let me = Uuid::new_v4();
        let identity = Identity::user(me);
        let mine = post(me, false);
        let theirs = post(Uuid::new_v4(), true);

        for action in [
            PostAction::Read,
            PostAction::Update,
            PostAction::Destroy,
            PostAction::Publish,
        ] {
            assert!(can_act_on_post(&identity, action, Some(&mine)));
        }

        assert!(can_act_on_post(&identity, PostAction::Read, Some(&theirs)));
        for action in [PostAction::Update, PostAction::Destroy, PostAction::Publish] {
            assert!(!can_act_on_post(&identity, action, Some(&theirs)));
        }
    }

    #[test]
    fn others_drafts_are_invisible() {
        let identity = Identity::user(Uuid::new_v4());
        let their_draft = post(Uuid::new_v4(), false);
        assert!(!can_act_on_post(&identity, PostAction::Read, Some(&their_draft)));
    }

    #[test]
    fn authenticated_users_may_create_posts() {
        assert!(can_act_on_post(
            &Identity::user(Uuid::new_v4()),
            PostAction::Create,
            None
        ));
    }

    #[test]
    fn comments_require_a_published_target() {
        let identity = Identity::user(Uuid::new_v4());
        let owner = Uuid::new_v4();
        assert!(can_act_on_comment(&identity, CommentAction::Create, &post(owner, true), None));
        assert!(!can_act_on_comment(&identity, CommentAction::Create, &post(owner, false), None));
    }

    #[test]
    fn comment_mutation_is_owner_only() {
        let me = Uuid::new_v4();
        let identity = Identity::user(me);
        let parent = post(Uuid::new_v4(), true);
        let mine = comment(parent.id, me);
        let theirs = comment(parent.id, Uuid::new_v4());

        assert!(can_act_on_comment(&identity, CommentAction::Update, &parent, Some(&mine)));
        assert!(can_act_on_comment(&identity, CommentAction::Destroy, &parent, Some(&mine)));
        assert!(!can_act_on_comment(&identity, CommentAction::Update, &parent, Some(&theirs)));
        assert!(!can_act_on_comment(&identity, CommentAction::Destroy, &parent, Some(&theirs)));
    }

    #[test]
    fn missing_resource_snapshot_is_denied() {
        // default deny: mutating actions with no target never pass
        let identity = Identity::user(Uuid::new_v4());
        assert!(!can_act_on_post(&identity, PostAction::Update, None));
        assert!(!can_act_on_post(&identity, PostAction::Read, None));
        let parent = post(Uuid::new_v4(), true);
        assert!(!can_act_on_comment(&identity, CommentAction::Update, &parent, None));
    }

    #[test]
    fn denials_map_to_the_right_error_kind() {
        let owner = Uuid::new_v4();
        let published = post(owner, true);

        let err = authorize_post(&Identity::anonymous(), PostAction::Publish, Some(&published))
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = authorize_post(
            &Identity::user(Uuid::new_v4()),
            PostAction::Publish,
            Some(&published),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}
