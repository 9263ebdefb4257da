pub mod auth;
pub mod health;
pub mod profile;
pub mod reports;

// Re-export handlers for easier imports
pub use auth::{login, logout, register};
pub use health::health_check;
pub use profile::{update_profile, user_profile};
pub use reports::{analyze_report, report_history};
