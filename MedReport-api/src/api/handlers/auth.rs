use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument};

use med_report_domain::entities::{LoginRequest, RegisterRequest};

use crate::api::error::ApiError;
use crate::api::extractors::AuthenticatedUser;
use crate::api::state::AppState;
use crate::entities::auth::AuthResponse;
use crate::entities::common::{ErrorResponse, MessageResponse};

/// Register a new account and log it in
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input or duplicate username/email", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(request) = payload?;
    info!("Registering user {}", request.username);

    let session = state.user_service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::from_session(session, "Registration successful")),
    ))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(request) = payload?;
    let session = state.user_service.login(request).await?;

    Ok(Json(AuthResponse::from_session(session, "Login successful")))
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn logout(State(state): State<AppState>, user: AuthenticatedUser) -> Json<MessageResponse> {
    state.user_service.logout(&user.claims);
    Json(MessageResponse::new("Logout successful"))
}
