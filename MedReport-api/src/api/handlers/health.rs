use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use med_report_domain::health::{ComponentStatus, SystemStatus};

use crate::api::state::AppState;

pub const SERVICE_NAME: &str = "MedReport Analyzer API";

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    pub service: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// RFC 3339 time the response was generated
    pub timestamp: String,
    /// Seconds since the application state was created
    pub uptime: u64,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Health of one component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    /// "healthy", "degraded" or "unhealthy"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

fn component_status_label(status: ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "healthy",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "unhealthy",
    }
}

/// Service status. Always answers 200 while the process can serve requests.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let health = state.health_service.get_system_health().await;
    debug!("Health check: {:?}", health.status);

    let status = match health.status {
        SystemStatus::Healthy => "healthy",
        SystemStatus::Degraded => "degraded",
    };

    let components = health
        .components
        .into_iter()
        .map(|(name, component)| {
            (
                name,
                ComponentHealth {
                    status: component_status_label(component.status).to_string(),
                    details: component.details,
                },
            )
        })
        .collect();

    Json(HealthResponse {
        status: status.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        uptime: state.started_at.elapsed().as_secs(),
        components,
    })
}
