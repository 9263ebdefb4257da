// Public entities for the MedReport API
// Request and response envelopes that cross the HTTP boundary

pub mod auth;
pub mod common;
pub mod profile;
pub mod reports;
