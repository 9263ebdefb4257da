// Storage models for users and medical reports
pub mod report;
pub mod user;

pub use report::{MedicalReport, NewMedicalReport};
pub use user::{NewUser, ProfileUpdate, User};
