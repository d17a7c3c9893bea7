/// Background jobs for blog-service
pub mod publish_scheduler;

pub use publish_scheduler::start_publish_scheduler;
