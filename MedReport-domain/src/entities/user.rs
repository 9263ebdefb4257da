use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct RegisterRequest {
    /// Unique login name
    #[validate(length(min = 3, max = 80, message = "Username must be between 3 and 80 characters"))]
    pub username: String,

    /// Unique email address
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    /// Plain-text password, hashed before it is stored
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Optional age in years
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,

    /// Optional gender
    #[validate(length(max = 20, message = "Gender cannot exceed 20 characters"))]
    pub gender: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Partial profile update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateProfileRequest {
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,

    #[validate(length(max = 20, message = "Gender cannot exceed 20 characters"))]
    pub gender: Option<String>,
}

/// Public view of a registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub email: String,
    pub age: Option<i32>,
    pub gender: Option<String>,

    /// RFC 3339 registration time
    pub joined_date: String,
}
