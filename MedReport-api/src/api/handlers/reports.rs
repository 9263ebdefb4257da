use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::extractors::AuthenticatedUser;
use crate::api::state::AppState;
use crate::entities::common::ErrorResponse;
use crate::entities::reports::{AnalyzeReportRequest, AnalyzeReportResponse, ReportHistoryResponse};

/// Analyze a set of test results and store the report
#[utoipa::path(
    post,
    path = "/api/analyze-report",
    request_body = AnalyzeReportRequest,
    responses(
        (status = 200, description = "Analysis result and stored report id", body = AnalyzeReportResponse),
        (status = 400, description = "No test data provided", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, user, payload), fields(user_id = %user.user_id))]
pub async fn analyze_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<AnalyzeReportRequest>, JsonRejection>,
) -> Result<Json<AnalyzeReportResponse>, ApiError> {
    let Json(request) = payload?;
    info!("Analyzing {} test results", request.test_results.len());

    let analyzed = state
        .report_service
        .analyze_and_store(&user.user_id, request.report_name, request.test_results)
        .await?;

    Ok(Json(AnalyzeReportResponse {
        success: true,
        analysis: analyzed.analysis,
        report_id: analyzed.report_id,
    }))
}

/// List the caller's reports, newest first
#[utoipa::path(
    get,
    path = "/api/report-history",
    responses(
        (status = 200, description = "Report history", body = ReportHistoryResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn report_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ReportHistoryResponse>, ApiError> {
    let reports = state.report_service.get_history(&user.user_id).await?;

    Ok(Json(ReportHistoryResponse {
        success: true,
        reports,
    }))
}
