use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use med_report_data::database::DatabasePool;
use med_report_data::repository::{ReportRepository, UserRepository};
use med_report_domain::auth::PasswordHashing;
use med_report_domain::health::{HealthService, HealthServiceTrait};
use med_report_domain::services::{ReportService, ReportServiceTrait, UserService, UserServiceTrait};

use crate::config::AppConfig;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub report_service: Arc<dyn ReportServiceTrait>,
    pub health_service: Arc<dyn HealthServiceTrait>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire services over a database pool, or over in-memory storage when
    /// `pool` is `None`
    pub fn new(pool: Option<DatabasePool>, config: &AppConfig) -> Self {
        let (users, reports) = match &pool {
            Some(pool) => {
                info!("Using SQLite-backed repositories");
                (UserRepository::with_pool(pool.clone()), ReportRepository::with_pool(pool.clone()))
            }
            None => {
                info!("Using in-memory repositories");
                (UserRepository::new(), ReportRepository::new())
            }
        };

        let hashing = PasswordHashing::with_rounds(config.password_hash_rounds);

        Self {
            user_service: Arc::new(UserService::new(users, hashing, config.tokens.clone())),
            report_service: Arc::new(ReportService::new(reports)),
            health_service: Arc::new(HealthService::new(pool)),
            started_at: Instant::now(),
        }
    }
}
