use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::models::{MedicalReport, ProfileUpdate, User};
use super::errors::RepositoryError;

/// In-memory storage for users, used when no database pool is configured
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, enforcing unique username and email
    pub fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut store = self.users.lock()?;

        if store.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("username".to_string()));
        }
        if store.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email".to_string()));
        }

        store.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let store = self.users.lock()?;
        Ok(store.get(id).cloned())
    }

    pub fn find_by<F>(&self, predicate: F) -> Result<Option<User>, RepositoryError>
    where
        F: Fn(&User) -> bool,
    {
        let store = self.users.lock()?;
        Ok(store.values().find(|u| predicate(u)).cloned())
    }

    /// Apply a partial profile update
    pub fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, RepositoryError> {
        let mut store = self.users.lock()?;
        let user = store
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id)))?;

        if let Some(age) = update.age {
            user.age = Some(age);
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }

        Ok(user.clone())
    }
}

/// In-memory storage for medical reports
#[derive(Debug, Clone, Default)]
pub struct InMemoryReportStore {
    reports: Arc<Mutex<Vec<MedicalReport>>>,
}

impl InMemoryReportStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, report: MedicalReport) -> Result<MedicalReport, RepositoryError> {
        let mut store = self.reports.lock()?;
        store.push(report.clone());
        Ok(report)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Option<MedicalReport>, RepositoryError> {
        let store = self.reports.lock()?;
        Ok(store.iter().find(|r| r.id == id).cloned())
    }

    /// Reports owned by `user_id`, newest first
    pub fn get_for_user(&self, user_id: &str) -> Result<Vec<MedicalReport>, RepositoryError> {
        let store = self.reports.lock()?;

        // Later inserts win timestamp ties.
        let mut reports: Vec<MedicalReport> = store
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        reports.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(reports)
    }
}
