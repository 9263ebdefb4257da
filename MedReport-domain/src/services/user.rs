use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error};
use validator::Validate;

use med_report_data::models::NewUser;
use med_report_data::repository::{RepositoryError, UserRepositoryTrait};

use crate::auth::logging;
use crate::auth::{self, Claims, PasswordHashing, SecurityError, TokenConfig};
use crate::entities::conversions;
use crate::entities::user::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile};
use crate::services::validation_message;

/// User service errors
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Validation error
    #[error("{0}")]
    ValidationError(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or revoked token
    #[error("{0}")]
    Unauthorized(String),

    /// Not found error
    #[error("User not found: {0}")]
    NotFound(String),

    /// Hashing or signing failure
    #[error("Security error: {0}")]
    Security(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// A logged-in user with the bearer token for the session
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
    pub claims: Claims,
}

/// Trait for user and session operations
#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    /// Create an account and open a session for it
    async fn register(&self, request: RegisterRequest) -> Result<AuthSession, UserServiceError>;

    /// Verify credentials and open a session
    async fn login(&self, request: LoginRequest) -> Result<AuthSession, UserServiceError>;

    /// Resolve a bearer token to its claims
    fn authenticate(&self, token: &str) -> Result<Claims, UserServiceError>;

    /// Revoke the session the claims belong to
    fn logout(&self, claims: &Claims);

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, UserServiceError>;

    async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UserServiceError>;
}

/// User service for domain logic
pub struct UserService<R: UserRepositoryTrait> {
    repository: R,
    hashing: PasswordHashing,
    tokens: TokenConfig,
}

impl<R: UserRepositoryTrait> UserService<R> {
    pub fn new(repository: R, hashing: PasswordHashing, tokens: TokenConfig) -> Self {
        Self {
            repository,
            hashing,
            tokens,
        }
    }

    fn map_repo_error(&self, err: RepositoryError) -> UserServiceError {
        match err {
            RepositoryError::NotFound(msg) => UserServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => UserServiceError::ValidationError(msg),
            RepositoryError::Conflict(field) if field == "username" => UserServiceError::UsernameTaken,
            RepositoryError::Conflict(field) if field == "email" => UserServiceError::EmailTaken,
            _ => {
                error!("User repository failure: {}", err);
                UserServiceError::RepositoryError(err.to_string())
            }
        }
    }

    fn open_session(&self, user: UserProfile) -> Result<AuthSession, UserServiceError> {
        let issued = auth::generate_token(&self.tokens, &user.id)
            .map_err(|e| UserServiceError::Security(e.to_string()))?;

        Ok(AuthSession {
            user,
            token: issued.token,
            claims: issued.claims,
        })
    }
}

#[async_trait]
impl<R: UserRepositoryTrait> UserServiceTrait for UserService<R> {
    async fn register(&self, request: RegisterRequest) -> Result<AuthSession, UserServiceError> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(validation_message(&e)))?;

        if self
            .repository
            .get_by_username(&request.username)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .is_some()
        {
            return Err(UserServiceError::UsernameTaken);
        }
        if self
            .repository
            .get_by_email(&request.email)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .is_some()
        {
            return Err(UserServiceError::EmailTaken);
        }

        let password_hash = self
            .hashing
            .hash(&request.password)
            .map_err(|e| UserServiceError::Security(e.to_string()))?;

        // A concurrent registration can still hit the unique constraints here.
        let user = self
            .repository
            .create(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                age: request.age,
                gender: request.gender,
            })
            .await
            .map_err(|e| self.map_repo_error(e))?;

        logging::log_registration(&user.id);
        self.open_session(conversions::convert_to_domain_profile(user))
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthSession, UserServiceError> {
        let user = self
            .repository
            .get_by_username(&request.username)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        let user = match user {
            Some(user) if self.hashing.verify(&request.password, &user.password_hash) => user,
            Some(_) => {
                logging::log_failed_login(&request.username, "wrong password");
                return Err(UserServiceError::InvalidCredentials);
            }
            None => {
                logging::log_failed_login(&request.username, "unknown user");
                return Err(UserServiceError::InvalidCredentials);
            }
        };

        logging::log_successful_login(&user.id);
        self.open_session(conversions::convert_to_domain_profile(user))
    }

    fn authenticate(&self, token: &str) -> Result<Claims, UserServiceError> {
        auth::validate_token(&self.tokens, token).map_err(|e| {
            debug!("Token rejected: {}", e);
            match e {
                SecurityError::TokenExpired => UserServiceError::Unauthorized("Token has expired".to_string()),
                SecurityError::TokenRevoked => UserServiceError::Unauthorized("Token has been revoked".to_string()),
                _ => UserServiceError::Unauthorized("Authentication required".to_string()),
            }
        })
    }

    fn logout(&self, claims: &Claims) {
        auth::revoke_token(claims);
        logging::log_logout(&claims.sub);
    }

    async fn get_profile(&self, user_id: &str) -> Result<UserProfile, UserServiceError> {
        let user = self
            .repository
            .get_by_id(user_id)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| UserServiceError::NotFound(user_id.to_string()))?;

        Ok(conversions::convert_to_domain_profile(user))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, UserServiceError> {
        request
            .validate()
            .map_err(|e| UserServiceError::ValidationError(validation_message(&e)))?;

        let user = self
            .repository
            .update_profile(user_id, conversions::convert_to_data_profile_update(request))
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(conversions::convert_to_domain_profile(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use med_report_data::repository::UserRepository;

    fn service() -> UserService<UserRepository> {
        UserService::new(
            UserRepository::new(),
            PasswordHashing::with_rounds(1_000),
            TokenConfig::new("user-service-test-secret", "test-issuer", Duration::minutes(5)),
        )
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            age: Some(40),
            gender: None,
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_opens_session() {
        let service = service();
        let session = service.register(register_request("alice", "alice@example.com")).await.unwrap();

        assert_eq!(session.user.username, "alice");
        assert_eq!(session.claims.sub, session.user.id);
        assert_eq!(service.authenticate(&session.token).unwrap().sub, session.user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let service = service();
        service.register(register_request("alice", "alice@example.com")).await.unwrap();

        let err = service.register(register_request("alice", "other@example.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "Username already exists");

        let err = service.register(register_request("bob", "alice@example.com")).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already exists");
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let err = service().register(register_request("al", "alice@example.com")).await.unwrap_err();
        assert!(matches!(err, UserServiceError::ValidationError(msg) if msg.contains("username")));
    }

    #[tokio::test]
    async fn test_login_checks_password() {
        let service = service();
        service.register(register_request("alice", "alice@example.com")).await.unwrap();

        assert!(service.login(login_request("alice", "secret1")).await.is_ok());
        assert!(matches!(
            service.login(login_request("alice", "wrong")).await,
            Err(UserServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(login_request("nobody", "secret1")).await,
            Err(UserServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_session() {
        let service = service();
        let first = service.register(register_request("alice", "alice@example.com")).await.unwrap();
        let second = service.login(login_request("alice", "secret1")).await.unwrap();

        service.logout(&first.claims);

        assert!(matches!(
            service.authenticate(&first.token),
            Err(UserServiceError::Unauthorized(msg)) if msg == "Token has been revoked"
        ));
        assert!(service.authenticate(&second.token).is_ok());
    }

    #[tokio::test]
    async fn test_profile_update_keeps_absent_fields() {
        let service = service();
        let session = service.register(register_request("alice", "alice@example.com")).await.unwrap();

        let profile = service
            .update_profile(
                &session.user.id,
                UpdateProfileRequest {
                    age: None,
                    gender: Some("female".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.age, Some(40));
        assert_eq!(profile.gender.as_deref(), Some("female"));
        assert_eq!(service.get_profile(&session.user.id).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        assert!(matches!(
            service().get_profile("missing").await,
            Err(UserServiceError::NotFound(_))
        ));
    }
}
