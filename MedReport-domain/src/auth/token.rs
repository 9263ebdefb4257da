use std::env;
use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::token_blacklist;
use crate::auth::Claims;

const DEFAULT_ISSUER: &str = "medreport-api";
const DEFAULT_EXPIRATION_MINUTES: i64 = 1440;
const DEV_SECRET: &str = "medreport-development-secret-change-me";

/// Security errors for authentication and token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// JWT validation error
    #[error("Token validation error: {0}")]
    TokenValidation(String),

    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Invalid token structure
    #[error("Invalid token format")]
    InvalidToken,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Token has been revoked
    #[error("Token has been revoked")]
    TokenRevoked,

    /// Password hashing failure
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

/// Signing settings for access tokens
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub issuer: String,
    pub expiration: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("expiration", &self.expiration)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, issuer: impl Into<String>, expiration: Duration) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            expiration,
        }
    }

    /// Read JWT_SECRET, JWT_ISSUER and ACCESS_TOKEN_EXPIRATION_MINUTES.
    ///
    /// A missing secret falls back to a fixed development value and logs a
    /// warning.
    pub fn from_env() -> Self {
        let secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET is not set, using the development secret");
            DEV_SECRET.to_string()
        });
        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());
        let minutes = env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_EXPIRATION_MINUTES);

        Self::new(secret, issuer, Duration::minutes(minutes))
    }
}

/// A freshly signed token with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Generate a new access token for a user
pub fn generate_token(config: &TokenConfig, user_id: &str) -> Result<IssuedToken, SecurityError> {
    let now = Utc::now();
    let expiration = now + config.expiration;

    let claims = Claims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        iss: config.issuer.clone(),
        iat: now.timestamp(),
        exp: expiration.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        error!("Failed to encode JWT token: {}", e);
        SecurityError::TokenValidation(e.to_string())
    })?;

    // Log token generation (but not the token itself)
    info!("Generated access token for user {}", user_id);
    debug!("Token expiration: {}", expiration);

    Ok(IssuedToken { token, claims })
}

/// Validate a token and return the decoded claims
pub fn validate_token(config: &TokenConfig, token: &str) -> Result<Claims, SecurityError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[config.issuer.as_str()]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidToken => SecurityError::InvalidToken,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => SecurityError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            SecurityError::TokenValidation("Invalid signature".to_string())
        }
        _ => SecurityError::TokenValidation(e.to_string()),
    })?;

    if token_blacklist::blacklist().is_revoked(&token_data.claims.jti) {
        debug!("Rejected revoked token {}", token_data.claims.jti);
        return Err(SecurityError::TokenRevoked);
    }

    Ok(token_data.claims)
}

/// Revoke a token until its natural expiry
pub fn revoke_token(claims: &Claims) {
    let expiration = UNIX_EPOCH + StdDuration::from_secs(claims.exp.max(0) as u64);
    let expiration = expiration.max(SystemTime::now());

    info!("Revoking token {} for user {}", claims.jti, claims.sub);
    token_blacklist::blacklist().revoke_token(&claims.jti, expiration);
}
