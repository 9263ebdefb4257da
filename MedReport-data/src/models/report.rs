use serde::{Deserialize, Serialize};

/// Storage model for an analyzed medical report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalReport {
    /// Unique identifier for the report
    pub id: String,

    /// Owner of the report
    pub user_id: String,

    /// Display name given by the user
    pub report_name: String,

    /// Raw test input, serialized as JSON text
    pub test_data: String,

    /// Analysis narrative produced for the report
    pub analysis_result: Option<String>,

    /// Recommendation narrative produced for the report
    pub recommendations: Option<String>,

    /// RFC 3339 timestamp of when the report was stored
    pub timestamp: String,
}

/// Input data for storing a new report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicalReport {
    pub user_id: String,
    pub report_name: String,
    pub test_data: String,
    pub analysis_result: Option<String>,
    pub recommendations: Option<String>,
}
