//! User entity model and DTOs.

use cursus_core::enrollment::Enrollment;
use cursus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    /// Embedded enrollment/progress document.
    pub enrollments: Json<Vec<Enrollment>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Strip the password hash for API output.
    pub fn into_response(self) -> UserResponse {
        UserResponse {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            is_active: self.is_active,
            enrollments: self.enrollments.0,
            created_at: self.created_at,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub enrollments: Vec<Enrollment>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new user. The email must already be lowercased and
/// the password hashed by the caller.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
