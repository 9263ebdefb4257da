use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tracing::debug;

use med_report_domain::auth::logging::log_token_rejected;
use med_report_domain::auth::Claims;

use crate::api::error::ApiError;
use crate::api::state::AppState;

const AUTH_REQUIRED: &str = "Authentication required";

/// The caller behind a valid bearer token.
///
/// Using it as a handler argument makes the route require authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub claims: Claims,
}

/// Token from an `Authorization: Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let path = parts.uri.path();

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        let Some(token) = token else {
            log_token_rejected(path, "missing bearer token");
            return Err(ApiError::Unauthorized(AUTH_REQUIRED.to_string()));
        };

        match state.user_service.authenticate(token) {
            Ok(claims) => {
                debug!("Authenticated user {} for {}", claims.sub, path);
                Ok(Self {
                    user_id: claims.sub.clone(),
                    claims,
                })
            }
            Err(e) => {
                log_token_rejected(path, &e.to_string());
                Err(e.into())
            }
        }
    }
}
