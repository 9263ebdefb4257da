// Domain services
// This module contains business logic implementations.

pub mod report;
pub mod user;

use validator::ValidationErrors;

// Re-export service traits and implementations
pub use report::{ReportService, ReportServiceError, ReportServiceTrait};
pub use user::{AuthSession, UserService, UserServiceError, UserServiceTrait};

/// Flatten validator errors into one message, fields in name order
pub(crate) fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}
