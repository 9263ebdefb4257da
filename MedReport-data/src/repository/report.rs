use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{MedicalReport, NewMedicalReport};
use super::errors::RepositoryError;
use super::in_memory::InMemoryReportStore;
use super::storage::DatabaseStorage;

/// Repository trait for analyzed medical reports
#[async_trait]
pub trait ReportRepositoryTrait: Send + Sync {
    /// Store a new report, stamping it with an ID and the current time
    async fn create(&self, report: NewMedicalReport) -> Result<MedicalReport, RepositoryError>;

    /// Get a report by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<MedicalReport>, RepositoryError>;

    /// Get every report owned by a user, newest first
    async fn get_for_user(&self, user_id: &str) -> Result<Vec<MedicalReport>, RepositoryError>;
}

#[derive(Debug, Clone)]
enum Backend {
    Database(DatabasePool),
    InMemory(InMemoryReportStore),
}

/// Repository for medical reports backed by SQLite or in-memory storage
#[derive(Debug, Clone)]
pub struct ReportRepository {
    backend: Backend,
}

impl Default for ReportRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRepository {
    /// Create a repository with in-memory storage
    pub fn new() -> Self {
        Self {
            backend: Backend::InMemory(InMemoryReportStore::new()),
        }
    }

    /// Create a repository backed by a database pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            backend: Backend::Database(pool),
        }
    }
}

#[async_trait]
impl ReportRepositoryTrait for ReportRepository {
    async fn create(&self, request: NewMedicalReport) -> Result<MedicalReport, RepositoryError> {
        if request.report_name.trim().is_empty() {
            return Err(RepositoryError::Validation("report_name must not be empty".to_string()));
        }

        let report = MedicalReport {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id,
            report_name: request.report_name,
            test_data: request.test_data,
            analysis_result: request.analysis_result,
            recommendations: request.recommendations,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        match &self.backend {
            Backend::Database(pool) => {
                DatabaseStorage::insert_report(pool, &report)?;
                Ok(report)
            }
            Backend::InMemory(store) => {
                debug!("Storing medical report in memory: id={}", report.id);
                store.insert(report)
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<MedicalReport>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_report(pool, id),
            Backend::InMemory(store) => store.get_by_id(id),
        }
    }

    async fn get_for_user(&self, user_id: &str) -> Result<Vec<MedicalReport>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_reports_for_user(pool, user_id),
            Backend::InMemory(store) => store.get_for_user(user_id),
        }
    }
}
