use med_report_data::models::{
    MedicalReport as DataMedicalReport, NewMedicalReport, ProfileUpdate, User as DataUser,
};
use tracing::warn;

use crate::entities::analysis::AnalysisResult;
use crate::entities::report::Report;
use crate::entities::user::{UpdateProfileRequest, UserProfile};

// Conversion functions between domain entities and data models.
// They follow the pattern convert_to_[target_layer]_[model_name].

/// Convert from data model to the public user profile
pub fn convert_to_domain_profile(user: DataUser) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username,
        email: user.email,
        age: user.age,
        gender: user.gender,
        joined_date: user.created_at,
    }
}

/// Convert from domain update request to data model
pub fn convert_to_data_profile_update(request: UpdateProfileRequest) -> ProfileUpdate {
    ProfileUpdate {
        age: request.age,
        gender: request.gender,
    }
}

/// Build the storage record for an analyzed submission
pub fn convert_to_data_new_report(
    user_id: &str,
    report_name: String,
    test_data: String,
    analysis: &AnalysisResult,
) -> NewMedicalReport {
    NewMedicalReport {
        user_id: user_id.to_string(),
        report_name,
        test_data,
        analysis_result: Some(analysis.analysis.clone()),
        recommendations: Some(analysis.recommendations.clone()),
    }
}

/// Convert from data model to domain report.
///
/// Stored test data that is no longer valid JSON is returned as a plain
/// string rather than failing the whole history.
pub fn convert_to_domain_report(report: DataMedicalReport) -> Report {
    let test_data = serde_json::from_str(&report.test_data).unwrap_or_else(|e| {
        warn!("Stored test data for report {} is not valid JSON: {}", report.id, e);
        serde_json::Value::String(report.test_data.clone())
    });

    Report {
        id: report.id,
        report_name: report.report_name,
        test_data,
        analysis_result: report.analysis_result,
        recommendations: report.recommendations,
        timestamp: report.timestamp,
    }
}
