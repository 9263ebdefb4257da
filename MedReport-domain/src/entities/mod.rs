pub mod analysis;
pub mod conversions;
pub mod report;
pub mod user;

// Re-export common types for easier imports
pub use analysis::{AnalysisResult, Direction, TestObservation, TestResults, TestStatus, TestValue};
pub use report::{AnalyzedReport, Report, DEFAULT_REPORT_NAME};
pub use user::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile};
