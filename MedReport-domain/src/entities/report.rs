use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use crate::entities::analysis::{AnalysisResult, TestResults};

/// Name used when a report is submitted without one
pub const DEFAULT_REPORT_NAME: &str = "Medical Report";

/// A stored, analyzed report as returned in history listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Report {
    pub id: String,
    pub report_name: String,

    /// Test results as originally submitted
    #[cfg_attr(feature = "with-api", schema(value_type = Object))]
    pub test_data: serde_json::Value,

    /// Analysis narrative
    pub analysis_result: Option<String>,

    /// Recommendation narrative
    pub recommendations: Option<String>,

    /// RFC 3339 storage time
    pub timestamp: String,
}

/// Outcome of analyzing and storing one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedReport {
    pub report_id: String,
    pub analysis: AnalysisResult,
}

/// Effective report name for a submission
pub fn report_name_or_default(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string())
}

/// Serialize submitted results for storage
pub fn serialize_test_data(test_results: &TestResults) -> Result<String, serde_json::Error> {
    serde_json::to_string(test_results)
}
