// Repository module structure
pub mod errors;
mod in_memory;
mod report;
mod storage;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use report::{ReportRepository, ReportRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
