use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use med_report_data::repository::{ReportRepositoryTrait, RepositoryError};

use crate::analysis::Analyzer;
use crate::entities::analysis::{AnalysisResult, TestResults};
use crate::entities::conversions;
use crate::entities::report::{self, AnalyzedReport, Report};

/// Report service errors
#[derive(Debug, Error)]
pub enum ReportServiceError {
    /// The submission held no test results
    #[error("No test data provided")]
    NoTestData,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Test data could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for report service operations
#[async_trait]
pub trait ReportServiceTrait: Send + Sync {
    /// Analyze test results without storing anything
    fn analyze(&self, test_results: &TestResults) -> Result<AnalysisResult, ReportServiceError>;

    /// Analyze test results and store them as a report owned by `user_id`
    async fn analyze_and_store(
        &self,
        user_id: &str,
        report_name: Option<String>,
        test_results: TestResults,
    ) -> Result<AnalyzedReport, ReportServiceError>;

    /// Reports owned by `user_id`, newest first
    async fn get_history(&self, user_id: &str) -> Result<Vec<Report>, ReportServiceError>;
}

/// Report service for domain logic
pub struct ReportService<R: ReportRepositoryTrait> {
    repository: R,
    analyzer: Analyzer,
}

impl<R: ReportRepositoryTrait> ReportService<R> {
    /// Create a report service using the standard reference tables
    pub fn new(repository: R) -> Self {
        Self::with_analyzer(repository, Analyzer::default())
    }

    pub fn with_analyzer(repository: R, analyzer: Analyzer) -> Self {
        Self { repository, analyzer }
    }

    fn map_repo_error(&self, err: RepositoryError) -> ReportServiceError {
        match err {
            RepositoryError::Validation(msg) => ReportServiceError::ValidationError(msg),
            _ => {
                error!("Report repository failure: {}", err);
                ReportServiceError::RepositoryError(err.to_string())
            }
        }
    }
}

#[async_trait]
impl<R: ReportRepositoryTrait> ReportServiceTrait for ReportService<R> {
    fn analyze(&self, test_results: &TestResults) -> Result<AnalysisResult, ReportServiceError> {
        if test_results.is_empty() {
            return Err(ReportServiceError::NoTestData);
        }
        Ok(self.analyzer.analyze(test_results))
    }

    async fn analyze_and_store(
        &self,
        user_id: &str,
        report_name: Option<String>,
        test_results: TestResults,
    ) -> Result<AnalyzedReport, ReportServiceError> {
        let analysis = self.analyze(&test_results)?;

        let test_data = report::serialize_test_data(&test_results)
            .map_err(|e| ReportServiceError::Serialization(e.to_string()))?;
        let report_name = report::report_name_or_default(report_name);

        let new_report = conversions::convert_to_data_new_report(user_id, report_name, test_data, &analysis);
        let stored = self
            .repository
            .create(new_report)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        info!(
            "Stored report {} for user {} (condition: {}, confidence: {})",
            stored.id, user_id, analysis.condition, analysis.confidence
        );

        Ok(AnalyzedReport {
            report_id: stored.id,
            analysis,
        })
    }

    async fn get_history(&self, user_id: &str) -> Result<Vec<Report>, ReportServiceError> {
        let reports = self
            .repository
            .get_for_user(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        debug!("Loaded {} reports for user {}", reports.len(), user_id);

        Ok(reports.into_iter().map(conversions::convert_to_domain_report).collect())
    }
}
