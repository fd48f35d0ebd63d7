//! User row model and DTOs.

use lingo_core::types::{DbId, Timestamp};
use lingo_core::users::User;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash. Convert into [`User`] before it leaves the
/// server.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: DbId,
    pub email: String,
    pub password_hash: Option<String>,
    pub full_name: String,
    pub role: String,
    pub auth_provider: String,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            auth_provider: row.auth_provider,
            is_active: row.is_active,
            is_email_verified: row.is_email_verified,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a local account.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}

/// DTO for a profile change. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub full_name: Option<String>,
}
