/// Visibility scope resolver
///
/// Computes, from an identity, the restricted view of the post collection
/// that reader may list. The same scope value backs single-post read
/// authorization and the listing queries in `db::post_repo`, so a caller
/// can never read an unlisted post by id (or vice versa).
///
/// Precedence: admin sees everything; an authenticated user sees published
/// posts plus their own drafts; anonymous callers see published posts only.
use uuid::Uuid;

use crate::models::{Identity, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Admin: unrestricted
    All,
    /// Authenticated non-admin: published posts plus their own
    PublishedOrOwn(Uuid),
    /// Anonymous: published posts only
    PublishedOnly,
}

impl VisibilityScope {
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_admin() {
            VisibilityScope::All
        } else if let Some(id) = identity.id {
            VisibilityScope::PublishedOrOwn(id)
        } else {
            VisibilityScope::PublishedOnly
        }
    }

    /// The canonical predicate. The SQL listing filters mirror this exactly.
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            VisibilityScope::All => true,
            VisibilityScope::PublishedOrOwn(user_id) => {
                post.published || post.user_id == *user_id
            }
            VisibilityScope::PublishedOnly => post.published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{can_act_on_post, PostAction};
    use chrono::Utc;

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

    fn sample_collection(user_a: Uuid, user_b: Uuid) -> Vec<Post> {
        vec![
            post(user_a, true),
            post(user_a, false),
            post(user_b, true),
            post(user_b, false),
        ]
    }

    #[test]
    fn admin_scope_is_unrestricted() {
        let admin = Identity::admin(Uuid::new_v4());
        let scope = VisibilityScope::for_identity(&admin);
        let posts = sample_collection(Uuid::new_v4(), Uuid::new_v4());
        assert!(posts.iter().all(|p| scope.matches(p)));
    }

    #[test]
    fn user_scope_is_published_or_own() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scope = VisibilityScope::for_identity(&Identity::user(me));

        let posts = sample_collection(me, other);
        let visible: Vec<&Post> = posts.iter().filter(|p| scope.matches(p)).collect();

        // my published + my draft + their published; never their draft
        assert_eq!(visible.len(), 3);
        assert!(visible.iter().all(|p| p.published || p.user_id == me));
    }

    #[test]
    fn anonymous_scope_is_published_only() {
        let scope = VisibilityScope::for_identity(&Identity::anonymous());
        let user_a = Uuid::new_v4();

        // P1 published, P2 draft owned by user A: the anonymous result set is {P1}
        let p1 = post(user_a, true);
        let p2 = post(user_a, false);
        let visible: Vec<&Post> = [&p1, &p2]
            .into_iter()
            .filter(|p| scope.matches(p))
            .collect();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, p1.id);
    }

    #[test]
    fn scope_and_read_authorization_never_diverge() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let posts = sample_collection(me, other);

        let identities = [
            Identity::anonymous(),
            Identity::user(me),
            Identity::admin(me),
        ];

        for identity in identities {
            let scope = VisibilityScope::for_identity(&identity);
            for p in &posts {
                assert_eq!(
                    scope.matches(p),
                    can_act_on_post(&identity, PostAction::Read, Some(p)),
                    "listing predicate and direct read decision disagree"
                );
            }
        }
    }
}
