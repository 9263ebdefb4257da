use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use med_report_domain::entities::{AnalysisResult, Report, TestResults};

/// Body of an analysis request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeReportRequest {
    /// Test name to value, numbers or numeric strings
    #[serde(default)]
    #[schema(value_type = Object, example = json!({"glucose": 130, "Systolic": "125"}))]
    pub test_results: TestResults,

    /// Defaults to "Medical Report"
    pub report_name: Option<String>,
}

/// Analysis outcome together with the id of the stored report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeReportResponse {
    pub success: bool,
    pub analysis: AnalysisResult,
    pub report_id: String,
}

/// The caller's reports, newest first
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportHistoryResponse {
    pub success: bool,
    pub reports: Vec<Report>,
}
