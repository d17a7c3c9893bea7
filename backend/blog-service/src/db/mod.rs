/// Database access layer
///
/// Repository functions over `PgPool` for posts, comments, and scheduled
/// publications, plus the startup schema bootstrap.
pub mod comment_repo;
pub mod post_repo;
pub mod schema;

pub use schema::ensure_tables;
