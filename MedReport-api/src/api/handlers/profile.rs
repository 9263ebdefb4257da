use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::instrument;

use med_report_domain::entities::UpdateProfileRequest;

use crate::api::error::ApiError;
use crate::api::extractors::AuthenticatedUser;
use crate::api::state::AppState;
use crate::entities::common::{ErrorResponse, MessageResponse};
use crate::entities::profile::ProfileResponse;

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/user-profile",
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn user_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state.user_service.get_profile(&user.user_id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: profile,
    }))
}

/// Update age and/or gender. Absent fields keep their current value.
#[utoipa::path(
    post,
    path = "/api/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "profile"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    state.user_service.update_profile(&user.user_id, request).await?;

    Ok(Json(MessageResponse::new("Profile updated")))
}
