// MedReport Data
// This crate handles persistence of users and analyzed reports

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
