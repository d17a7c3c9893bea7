/// HTTP handlers for blog endpoints
///
/// Handlers are thin: they resolve the caller's identity, deserialize and
/// shape-check the request, and delegate to the services, which perform the
/// real authorization and invariant checks.
pub mod comments;
pub mod posts;

// Re-export handler functions at module level
pub use comments::{create_comment, delete_comment, list_post_comments, update_comment};
pub use posts::{
    create_post, delete_post, get_post, list_drafts, list_posts, list_published, publish_post,
    update_post,
};
