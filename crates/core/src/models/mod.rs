//! Domain models for users and their profile metadata.
//!
//! These models are storage-agnostic and represent the canonical
//! form of user data within the domain layer. The password hash is
//! deliberately absent from [`User`]: read projections never carry
//! credentials, a dedicated repository lookup fetches the hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// User
// =============================================================================

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Client,
    Owner,
    Delivery,
}

impl UserRole {
    /// The canonical string form stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Client => "Client",
            UserRole::Owner => "Owner",
            UserRole::Delivery => "Delivery",
        }
    }

    /// Parse the canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Client" => Some(UserRole::Client),
            "Owner" => Some(UserRole::Owner),
            "Delivery" => Some(UserRole::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Unique email address.
    pub email: String,
    /// Account role.
    pub role: UserRole,
    /// Whether the email address has been verified.
    pub verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Entity type tag embedded in pagination cursors issued for users.
    pub const CURSOR_TYPE: &'static str = "User";
}

/// Input for creating a user row.
///
/// `password_hash` is the already-hashed credential; hashing happens
/// upstream through the [`crate::ports::PasswordHasher`] port.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Partial update of a user row. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub verified: Option<bool>,
}

// =============================================================================
// User Metadata
// =============================================================================

/// Profile metadata attached to a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetadata {
    /// Primary key.
    pub id: i64,
    /// Owning user.
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserMetadata {
    /// Entity type tag embedded in pagination cursors issued for metadata.
    pub const CURSOR_TYPE: &'static str = "UserMetadata";
}

/// Input for creating a metadata row.
///
/// The owning `user_id` is not part of the input; it is assigned by the
/// repository when the row is inserted alongside its user.
#[derive(Debug, Clone)]
pub struct NewUserMetadata {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
}

/// Partial update of a metadata row. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserMetadataUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
}

// =============================================================================
// Registration
// =============================================================================

/// Input for registering a new account with its profile.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub email: String,
    /// Plain-text password; hashed by the service before storage.
    pub password: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub postal_code: String,
    pub address: String,
    pub phone: Option<String>,
    pub signup_id: Option<String>,
    pub unit_no: Option<String>,
    pub state_province: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: le rôle fait l'aller-retour avec sa forme stockée
    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Client, UserRole::Owner, UserRole::Delivery] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("Admin"), None);
    }
}
