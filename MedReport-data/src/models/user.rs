use serde::{Deserialize, Serialize};

/// Storage model for a registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier for the user
    pub id: String,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// PHC-formatted password hash
    pub password_hash: String,

    /// Optional age in years
    pub age: Option<i32>,

    /// Optional gender
    pub gender: Option<String>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}

/// Input data for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<i32>,
    pub gender: Option<String>,
}
