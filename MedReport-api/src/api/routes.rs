use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::api::handlers::{auth, health, profile, reports};
use crate::api::state::AppState;
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(state: AppState, cors_allowed_origin: &str) -> Router {
    debug!("Creating application router");

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login));

    // Authentication is enforced by the AuthenticatedUser extractor.
    let protected_routes = Router::new()
        .route("/api/logout", post(auth::logout))
        .route("/api/analyze-report", post(reports::analyze_report))
        .route("/api/report-history", get(reports::report_history))
        .route("/api/user-profile", get(profile::user_profile))
        .route("/api/update-profile", post(profile::update_profile));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(configure_swagger_routes());

    debug!("Routes configured");

    app.layer(cors_layer(cors_allowed_origin))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the single configured browser origin, with credentials
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS_ALLOWED_ORIGIN '{}', cross-origin requests will be refused", origin);
            layer
        }
    }
}
