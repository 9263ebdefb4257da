//! Authentication for MedReport: password hashing, signed bearer tokens and
//! token revocation.

use serde::{Deserialize, Serialize};

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

pub mod logging;
pub mod password;
pub mod token;
pub mod token_blacklist;

pub use password::PasswordHashing;
pub use token::{generate_token, revoke_token, validate_token, IssuedToken, SecurityError, TokenConfig};

/// Claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Token ID, used for revocation
    pub jti: String,
    /// Issuer
    pub iss: String,
    /// Issued at (as timestamp)
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}
