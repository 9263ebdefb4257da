use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::database::DatabasePool;
use crate::models::{NewUser, ProfileUpdate, User};
use super::errors::RepositoryError;
use super::in_memory::InMemoryUserStore;
use super::storage::{DatabaseStorage, UserLookup};

/// Repository trait for registered users
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Create a new user. Fails with `Conflict` on a duplicate username or email.
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Get a user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError>;

    /// Get a user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Get a user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Update age and/or gender, returning the stored user
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, RepositoryError>;
}

#[derive(Debug, Clone)]
enum Backend {
    Database(DatabasePool),
    InMemory(InMemoryUserStore),
}

/// Repository for users backed by SQLite or in-memory storage
#[derive(Debug, Clone)]
pub struct UserRepository {
    backend: Backend,
}

impl Default for UserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl UserRepository {
    /// Create a repository with in-memory storage
    pub fn new() -> Self {
        Self {
            backend: Backend::InMemory(InMemoryUserStore::new()),
        }
    }

    /// Create a repository backed by a database pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            backend: Backend::Database(pool),
        }
    }

    fn lookup(&self, column: UserLookup, value: &str) -> Result<Option<User>, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::get_user_by(pool, column, value),
            Backend::InMemory(store) => match column {
                UserLookup::Id => store.get_by_id(value),
                UserLookup::Username => store.find_by(|u| u.username == value),
                UserLookup::Email => store.find_by(|u| u.email == value),
            },
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, request: NewUser) -> Result<User, RepositoryError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: request.username,
            email: request.email,
            password_hash: request.password_hash,
            age: request.age,
            gender: request.gender,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        };

        match &self.backend {
            Backend::Database(pool) => {
                DatabaseStorage::insert_user(pool, &user)?;
                Ok(user)
            }
            Backend::InMemory(store) => {
                debug!("Storing user in memory: id={}", user.id);
                store.insert(user)
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        self.lookup(UserLookup::Id, id)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.lookup(UserLookup::Username, username)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.lookup(UserLookup::Email, email)
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User, RepositoryError> {
        match &self.backend {
            Backend::Database(pool) => DatabaseStorage::update_profile(pool, id, &update)?
                .ok_or_else(|| RepositoryError::NotFound(format!("user {}", id))),
            Backend::InMemory(store) => store.update_profile(id, update),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_pool, DatabaseConfig};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$pbkdf2-sha256$fake".to_string(),
            age: Some(40),
            gender: None,
        }
    }

    fn repositories() -> Vec<UserRepository> {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        vec![UserRepository::new(), UserRepository::with_pool(pool)]
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        for repo in repositories() {
            let created = repo.create(new_user("alice", "alice@example.com")).await.unwrap();

            let by_id = repo.get_by_id(&created.id).await.unwrap().unwrap();
            assert_eq!(by_id, created);

            let by_name = repo.get_by_username("alice").await.unwrap().unwrap();
            assert_eq!(by_name.email, "alice@example.com");

            let by_email = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
            assert_eq!(by_email.id, created.id);

            assert!(repo.get_by_username("bob").await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_conflict() {
        for repo in repositories() {
            repo.create(new_user("alice", "alice@example.com")).await.unwrap();

            let err = repo.create(new_user("alice", "other@example.com")).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Conflict(ref f) if f == "username"), "got {:?}", err);

            let err = repo.create(new_user("alicia", "alice@example.com")).await.unwrap_err();
            assert!(matches!(err, RepositoryError::Conflict(ref f) if f == "email"), "got {:?}", err);
        }
    }

    #[tokio::test]
    async fn test_update_profile_keeps_missing_fields() {
        for repo in repositories() {
            let created = repo.create(new_user("carol", "carol@example.com")).await.unwrap();

            let updated = repo
                .update_profile(&created.id, ProfileUpdate { age: None, gender: Some("female".to_string()) })
                .await
                .unwrap();
            assert_eq!(updated.age, Some(40));
            assert_eq!(updated.gender.as_deref(), Some("female"));

            let err = repo.update_profile("missing", ProfileUpdate::default()).await.unwrap_err();
            assert!(matches!(err, RepositoryError::NotFound(_)));
        }
    }
}
