use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use med_report_domain::services::{ReportServiceError, UserServiceError};

use crate::entities::common::ErrorResponse;

/// Errors returned by handlers, rendered as `{success: false, error}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Details are logged, never returned to the client
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(details) => {
                error!("Internal error: {}", details);
                "An unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::ValidationError(_)
            | UserServiceError::UsernameTaken
            | UserServiceError::EmailTaken => ApiError::BadRequest(err.to_string()),
            UserServiceError::InvalidCredentials | UserServiceError::Unauthorized(_) => {
                ApiError::Unauthorized(err.to_string())
            }
            // A valid token whose user no longer exists
            UserServiceError::NotFound(_) => ApiError::Unauthorized("Authentication required".to_string()),
            UserServiceError::Security(_) | UserServiceError::RepositoryError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ReportServiceError> for ApiError {
    fn from(err: ReportServiceError) -> Self {
        match err {
            ReportServiceError::NoTestData | ReportServiceError::ValidationError(_) => {
                ApiError::BadRequest(err.to_string())
            }
            ReportServiceError::Serialization(_) | ReportServiceError::RepositoryError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        assert_eq!(ApiError::from(UserServiceError::UsernameTaken).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(UserServiceError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(ReportServiceError::NoTestData).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(ReportServiceError::RepositoryError("db down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_are_client_facing() {
        assert_eq!(ApiError::from(UserServiceError::EmailTaken).to_string(), "Email already exists");
        assert_eq!(ApiError::from(ReportServiceError::NoTestData).to_string(), "No test data provided");
    }
}
