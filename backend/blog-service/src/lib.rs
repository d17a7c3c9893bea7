/// Blog Service Library
///
/// The Quill publishing platform: authenticated users write posts, posts are
/// drafts until published (manually or one hour after creation), and
/// published posts accept comments. Visibility and authorization rules are
/// enforced inside the service layer for every operation.
///
/// # Modules
///
/// - `auth`: Authorization decision table and visibility scope resolver
/// - `models`: Data structures and entity invariants
/// - `services`: Business logic layer
/// - `db`: Database access layer and schema bootstrap
/// - `jobs`: Deferred publish scheduler
/// - `handlers`: HTTP request handlers
/// - `middleware`: Identity resolution from bearer tokens
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
