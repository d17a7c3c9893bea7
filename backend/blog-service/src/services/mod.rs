/// Business logic layer for blog-service
///
/// Every operation takes the caller's `Identity` explicitly, authorizes
/// internally, and re-checks entity invariants itself. The HTTP layer is
/// not trusted to have checked anything.
pub mod comments;
pub mod posts;

pub use comments::CommentService;
pub use posts::PostService;
