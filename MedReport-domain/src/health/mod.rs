//! Domain layer health check functionality

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use med_report_data::database::{self, DatabasePool};

use crate::analysis::ReferenceTables;

/// Overall system status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Something is not healthy but requests are still served
    Degraded,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    pub components: BTreeMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;
}

/// Health checks over the storage backend and the analyzer tables
#[derive(Debug, Clone)]
pub struct HealthService {
    pool: Option<DatabasePool>,
}

impl HealthService {
    /// `pool` is `None` when the service runs on in-memory storage
    pub fn new(pool: Option<DatabasePool>) -> Self {
        Self { pool }
    }

    fn database_component(&self) -> HealthComponent {
        match &self.pool {
            Some(pool) => match database::get_connection_info(pool) {
                Ok(info) => HealthComponent {
                    status: ComponentStatus::Healthy,
                    details: Some(info),
                },
                Err(e) => {
                    warn!("Database health check failed: {}", e);
                    HealthComponent {
                        status: ComponentStatus::Unhealthy,
                        details: Some(format!("Database connection error: {}", e)),
                    }
                }
            },
            None => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Database unavailable, using in-memory storage".to_string()),
            },
        }
    }

    fn analyzer_component(&self) -> HealthComponent {
        let tables = ReferenceTables::shared();
        HealthComponent {
            status: ComponentStatus::Healthy,
            details: Some(format!("{} reference ranges loaded", tables.ranges().len())),
        }
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let components: BTreeMap<String, HealthComponent> = [
            ("analyzer".to_string(), self.analyzer_component()),
            ("database".to_string(), self.database_component()),
        ]
        .into_iter()
        .collect();

        let status = if components.values().all(|c| c.status == ComponentStatus::Healthy) {
            SystemStatus::Healthy
        } else {
            SystemStatus::Degraded
        };

        SystemHealth { status, components }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use med_report_data::database::{create_pool, DatabaseConfig};

    #[tokio::test]
    async fn test_healthy_with_database() {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        let health = HealthService::new(Some(pool)).get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
        assert_eq!(
            health.components["analyzer"].details.as_deref(),
            Some("10 reference ranges loaded")
        );
    }

    #[tokio::test]
    async fn test_degraded_without_database() {
        let health = HealthService::new(None).get_system_health().await;

        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components["database"].status, ComponentStatus::Degraded);
    }
}
