use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use med_report_domain::entities::UserProfile;
use med_report_domain::services::AuthSession;

/// User information returned on login and registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

impl From<UserProfile> for PublicUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            age: profile.age,
            gender: profile.gender,
        }
    }
}

/// Response for successful registration or login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,

    /// Bearer token for the new session
    pub token: String,

    /// Always "Bearer"
    pub token_type: String,

    /// Expiration as a Unix timestamp
    pub expires_at: i64,
}

impl AuthResponse {
    pub fn from_session(session: AuthSession, message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            expires_at: session.claims.exp,
            user: session.user.into(),
            token: session.token,
            token_type: "Bearer".to_string(),
        }
    }
}
