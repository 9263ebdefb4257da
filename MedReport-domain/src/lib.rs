// MedReport Domain
// This crate contains the business logic for the MedReport analyzer

// Rule-based test result analysis
pub mod analysis;

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use med_report_data::database;

pub use analysis::Analyzer;
pub use entities::{AnalysisResult, TestResults, TestStatus, TestValue};
